//! Broadcaster - 实时事件分发
//!
//! 每个 WebSocket 连接注册一个有界发送队列和订阅的 topic 集合。
//!
//! ```text
//! OrderEngine / MenuCatalog / TableRegistry
//!       │ CafeEvent
//!       ▼
//! Broadcaster::broadcast  (序列化一次)
//!   └── connections: id → (mpsc::Sender, Subscription)
//!         │ try_send (满则丢弃, 关闭则移除)
//!         ▼
//!   WS session task → socket
//! ```
//!
//! 投递是尽力而为的：不重试、不排队、不回放。客户端收到事件后应自行
//! 重新拉取权威数据。

use dashmap::DashMap;
use shared::message::{CafeEvent, Topic};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// 默认每连接缓冲
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// 连接订阅的 topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    /// 所有事件 (默认)
    All,
    Topics(HashSet<Topic>),
}

impl Subscription {
    /// 解析 `?topics=order:12,menu`；缺省或空串表示全部
    pub fn parse(raw: Option<&str>) -> Result<Self, String> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::All);
        };

        let topics = raw
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse::<Topic>)
            .collect::<Result<HashSet<_>, _>>()?;

        if topics.is_empty() {
            Ok(Self::All)
        } else {
            Ok(Self::Topics(topics))
        }
    }

    pub fn matches(&self, topics: &[Topic]) -> bool {
        match self {
            Self::All => true,
            Self::Topics(subscribed) => topics.iter().any(|t| subscribed.contains(t)),
        }
    }
}

/// 单次广播的投递结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    /// 成功放入队列
    pub delivered: usize,
    /// 队列已满，消息丢弃
    pub dropped: usize,
    /// 连接已关闭，已从注册表移除
    pub pruned: usize,
}

struct Connection {
    tx: mpsc::Sender<Arc<str>>,
    subscription: Subscription,
}

/// 全局广播器 (Arc 共享，Clone 成本极低)
#[derive(Clone)]
pub struct Broadcaster {
    connections: Arc<DashMap<u64, Connection>>,
    next_id: Arc<AtomicU64>,
    capacity: usize,
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("connections", &self.connections.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            capacity: capacity.max(1),
        }
    }

    /// 注册连接，返回连接 ID 和接收端
    pub fn register(&self, subscription: Subscription) -> (u64, mpsc::Receiver<Arc<str>>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.capacity);
        self.connections.insert(id, Connection { tx, subscription });
        tracing::debug!(connection_id = id, "Live connection registered");
        (id, rx)
    }

    pub fn unregister(&self, id: u64) {
        if self.connections.remove(&id).is_some() {
            tracing::debug!(connection_id = id, "Live connection unregistered");
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// 向所有匹配的连接投递事件
    ///
    /// 永不失败：单个连接的问题不影响其他连接，也不会传给调用方。
    pub fn broadcast(&self, event: &CafeEvent) -> DeliveryReport {
        let payload: Arc<str> = match serde_json::to_string(event) {
            Ok(json) => json.into(),
            Err(e) => {
                tracing::error!(event = event.event_type(), error = %e, "Failed to serialize event");
                return DeliveryReport::default();
            }
        };
        let topics = event.topics();

        let mut report = DeliveryReport::default();
        let mut closed = Vec::new();

        for entry in self.connections.iter() {
            if !entry.subscription.matches(&topics) {
                continue;
            }
            match entry.tx.try_send(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.dropped += 1;
                    tracing::warn!(
                        connection_id = *entry.key(),
                        event = event.event_type(),
                        "Live connection buffer full, event dropped"
                    );
                }
                Err(TrySendError::Closed(_)) => closed.push(*entry.key()),
            }
        }

        // 迭代期间持有分片读锁，移除必须在迭代之后
        for id in closed {
            if self.connections.remove(&id).is_some() {
                report.pruned += 1;
            }
        }

        tracing::debug!(
            event = event.event_type(),
            delivered = report.delivered,
            dropped = report.dropped,
            pruned = report.pruned,
            "Event broadcast"
        );
        report
    }
}
