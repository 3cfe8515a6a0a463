//! 过期短链接清理任务
//!
//! 定期删除 `expireAt <= now` 的记录。解析路径自己检查过期时间，
//! 所以清理只负责回收空间，不影响正确性。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info};

use crate::errors::Result;
use crate::storage::LinkStore;

pub struct ExpiryReclaimer {
    store: Arc<dyn LinkStore>,
    interval: Duration,
}

/// 后台清理任务句柄
pub struct ReclaimerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReclaimerHandle {
    /// 通知任务退出并等待其结束
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!("Expiry reclaimer task ended abnormally: {}", e);
        }
    }
}

impl ExpiryReclaimer {
    pub fn new(store: Arc<dyn LinkStore>, interval: Duration) -> Self {
        Self {
            store,
            // interval 为 0 时 tokio 会 panic
            interval: interval.max(Duration::from_secs(1)),
        }
    }

    /// 执行一次清理
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<u64> {
        let removed = self.store.reclaim_expired(now).await?;
        if removed > 0 {
            info!(
                "Expiry reclaimer removed {} links from {} storage",
                removed,
                self.store.backend_name()
            );
        } else {
            debug!("Expiry reclaimer: nothing to remove");
        }
        Ok(removed)
    }

    /// 启动后台清理任务
    pub fn spawn(self) -> ReclaimerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(
                "Expiry reclaimer started (interval {}s)",
                self.interval.as_secs()
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // 失败只记录日志，下一轮继续
                        if let Err(e) = self.run_once(Utc::now()).await {
                            error!("Expiry reclaimer sweep failed: {}", e);
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Expiry reclaimer stopped");
        });

        ReclaimerHandle { shutdown_tx, task }
    }
}
