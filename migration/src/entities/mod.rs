pub mod link_record;

pub use link_record::Entity as LinkRecordEntity;
