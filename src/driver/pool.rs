//! Connection Pool
//!
//! 연결 풀
//!
//! 유휴 연결은 `max_connections` 크기의 버퍼에 보관합니다. 버퍼는
//! `parking_lot::Mutex<VecDeque>` 와, 보관된 연결 수만큼 permit 을 가진
//! `Semaphore` 의 조합입니다. 열린 연결 수는 풀 밖으로 나간 연결까지 포함해
//! 세며, 연결 핸들이 drop 될 때 감소합니다.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, Notify, Semaphore};
use tokio_util::sync::CancellationToken;

use super::connection::{Connection, Connector};
use super::error::{DriverError, DriverResult};
use super::with_deadline;

/// 기본 최소 연결 수
pub const DEFAULT_MIN_CONNECTIONS: usize = 3;

/// 기본 최대 연결 수
pub const DEFAULT_MAX_CONNECTIONS: usize = 5;

// ============================================================================
// PoolConfig - 풀 설정
// ============================================================================

/// 연결 풀 설정
///
/// | 필드 | 기본값 | 설명 |
/// |------|--------|------|
/// | `min_connections` | 3 | 생성 시 미리 여는 연결 수, 유지할 최소 연결 수 |
/// | `max_connections` | 5 | 최대 연결 수 (유휴 버퍼 크기) |
/// | `acquire_timeout` | 없음 | 연결 획득 대기 제한 |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// 최소 연결 수
    pub min_connections: usize,
    /// 최대 연결 수
    pub max_connections: usize,
    /// 연결 획득 타임아웃
    pub acquire_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: DEFAULT_MIN_CONNECTIONS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: None,
        }
    }
}

impl PoolConfig {
    /// 빌더 패턴으로 풀 설정 생성
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::default()
    }

    /// 설정 검증
    pub fn validate(&self) -> DriverResult<()> {
        if self.max_connections == 0 {
            return Err(DriverError::configuration("max_connections must be at least 1"));
        }
        if self.min_connections > self.max_connections {
            return Err(DriverError::configuration(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }
}

/// 풀 설정 빌더
#[derive(Debug, Clone, Default)]
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfigBuilder {
    /// 최소 연결 수 설정
    pub fn min_connections(mut self, size: usize) -> Self {
        self.config.min_connections = size;
        self
    }

    /// 최대 연결 수 설정
    pub fn max_connections(mut self, size: usize) -> Self {
        self.config.max_connections = size;
        self
    }

    /// 연결 획득 타임아웃 설정
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.config.acquire_timeout = Some(timeout);
        self
    }

    /// 설정 빌드
    pub fn build(self) -> PoolConfig {
        self.config
    }
}

// ============================================================================
// ConnectionState - 연결 상태
// ============================================================================

/// 연결 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// 유휴 상태
    Idle,
    /// 사용 중
    InUse,
    /// 교환 도중 실패 (재사용 불가)
    Broken,
    /// 닫힘
    Closed,
}

// ============================================================================
// PooledConnection - 풀링된 연결
// ============================================================================

/// 열린 연결 카운터
#[derive(Debug, Default)]
struct Slots {
    opened: AtomicUsize,
    freed: Notify,
}

impl Slots {
    fn opened(&self) -> usize {
        self.opened.load(Ordering::Acquire)
    }
}

/// 풀링된 연결
///
/// 풀에서 획득한 연결의 독점 핸들입니다. drop 되면 풀의 열린 연결 수에서
/// 빠집니다.
pub struct PooledConnection<T> {
    /// 연결 ID
    id: u64,
    /// 생성 시간
    created_at: Instant,
    /// 마지막 사용 시간
    last_used: Instant,
    /// 상태
    state: ConnectionState,
    /// 풀 카운터
    slots: Arc<Slots>,
    /// 실제 연결
    inner: T,
}

impl<T> PooledConnection<T> {
    fn new(id: u64, inner: T, slots: Arc<Slots>) -> Self {
        slots.opened.fetch_add(1, Ordering::AcqRel);
        let now = Instant::now();
        Self {
            id,
            created_at: now,
            last_used: now,
            state: ConnectionState::Idle,
            slots,
            inner,
        }
    }

    /// 연결 ID
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 생성 시간
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// 마지막 사용 시간
    pub fn last_used(&self) -> Instant {
        self.last_used
    }

    /// 연결 상태
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// 실제 연결 참조
    pub fn connection(&self) -> &T {
        &self.inner
    }

    /// 실제 연결 참조 (가변)
    pub fn connection_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// 사용으로 표시
    pub fn mark_in_use(&mut self) {
        self.state = ConnectionState::InUse;
        self.last_used = Instant::now();
    }

    /// 유휴로 표시
    pub fn mark_idle(&mut self) {
        self.state = ConnectionState::Idle;
        self.last_used = Instant::now();
    }

    /// 재사용 불가로 표시
    ///
    /// 반환 시 버퍼로 돌아가지 않고 닫힙니다.
    pub fn mark_broken(&mut self) {
        self.state = ConnectionState::Broken;
    }

    /// 재사용 불가 여부
    pub fn is_broken(&self) -> bool {
        self.state == ConnectionState::Broken
    }
}

impl<T: Connection> PooledConnection<T> {
    /// 연결 닫기
    pub async fn close(&mut self) -> DriverResult<()> {
        self.state = ConnectionState::Closed;
        self.inner.close().await
    }
}

impl<T> std::fmt::Debug for PooledConnection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("age", &self.created_at.elapsed())
            .finish()
    }
}

impl<T> Drop for PooledConnection<T> {
    fn drop(&mut self) {
        self.slots.opened.fetch_sub(1, Ordering::AcqRel);
        self.slots.freed.notify_waiters();
    }
}

// ============================================================================
// PoolMetrics - 풀 메트릭
// ============================================================================

/// 풀 메트릭
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolMetrics {
    /// 열린 연결 수
    pub opened: usize,
    /// 유휴 연결 수
    pub idle: usize,
    /// 사용 중인 연결 수
    pub in_use: usize,
    /// 총 획득 횟수
    pub total_acquisitions: u64,
    /// 총 생성 횟수
    pub total_created: u64,
    /// 총 닫힌 연결 수
    pub total_closed: u64,
}

// ============================================================================
// ConnectionPool - 연결 풀
// ============================================================================

/// 연결 풀
pub struct ConnectionPool<C: Connector> {
    /// 전송 팩토리
    connector: C,
    /// 풀 설정
    config: PoolConfig,
    /// 유휴 연결들
    idle: Mutex<VecDeque<PooledConnection<C::Connection>>>,
    /// 유휴 연결 수만큼의 permit
    available: Semaphore,
    /// 증설/축소 판단 잠금
    grow_lock: AsyncMutex<()>,
    /// 열린 연결 카운터
    slots: Arc<Slots>,
    /// 다음 연결 ID
    next_id: AtomicU64,
    /// 총 획득 횟수
    total_acquisitions: AtomicU64,
    /// 총 생성 횟수
    total_created: AtomicU64,
    /// 총 닫힌 횟수
    total_closed: AtomicU64,
    /// 열린 상태
    open: RwLock<bool>,
}

impl<C: Connector> ConnectionPool<C> {
    /// 새 연결 풀 생성
    ///
    /// `min_connections` 개의 연결을 동시에 열어 유휴 버퍼에 넣습니다.
    /// 워밍업 중 실패한 연결은 무시되며 그만큼 가용 연결이 줄어듭니다.
    pub async fn new(connector: C, config: PoolConfig) -> DriverResult<Self> {
        config.validate()?;

        let pool = Self {
            connector,
            idle: Mutex::new(VecDeque::with_capacity(config.max_connections)),
            available: Semaphore::new(0),
            grow_lock: AsyncMutex::new(()),
            slots: Arc::new(Slots::default()),
            next_id: AtomicU64::new(1),
            total_acquisitions: AtomicU64::new(0),
            total_created: AtomicU64::new(0),
            total_closed: AtomicU64::new(0),
            open: RwLock::new(true),
            config,
        };

        let warmed = pool.warmup().await;
        tracing::debug!(
            warmed,
            min = pool.config.min_connections,
            max = pool.config.max_connections,
            "connection pool ready"
        );

        Ok(pool)
    }

    /// 연결 풀 워밍업
    async fn warmup(&self) -> usize {
        let dials = (0..self.config.min_connections).map(|_| self.open_connection());

        let mut warmed = 0;
        for result in join_all(dials).await {
            match result {
                Ok(mut conn) => {
                    conn.mark_idle();
                    if self.try_put(conn).is_ok() {
                        warmed += 1;
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "warm-up connection failed");
                }
            }
        }
        warmed
    }

    /// 연결 획득
    ///
    /// 1. 유휴 버퍼에서 즉시 가져오기
    /// 2. `max_connections` 미만이면 새 연결 열기 (버퍼를 거치지 않음)
    /// 3. 아니면 다른 호출자가 반환할 때까지 대기
    ///
    /// 대기는 `cancel` 또는 `acquire_timeout` 으로 중단할 수 있습니다.
    pub async fn acquire(
        &self,
        cancel: &CancellationToken,
    ) -> DriverResult<PooledConnection<C::Connection>> {
        self.ensure_open()?;
        if cancel.is_cancelled() {
            return Err(DriverError::Canceled);
        }

        let mut conn = match self.try_take() {
            Some(conn) => conn,
            None => {
                let wait = with_deadline(
                    self.config.acquire_timeout,
                    "connection acquisition timeout",
                    self.acquire_slow(),
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(DriverError::Canceled),
                    result = wait => result?,
                }
            }
        };

        conn.mark_in_use();
        self.total_acquisitions.fetch_add(1, Ordering::Relaxed);
        Ok(conn)
    }

    async fn acquire_slow(&self) -> DriverResult<PooledConnection<C::Connection>> {
        loop {
            if !self.is_open() {
                return Err(DriverError::NoConnectionsAvailable);
            }

            // 카운터 확인 전에 등록해야 그 사이의 반환을 놓치지 않음
            let freed = self.slots.freed.notified();

            {
                let _grow = self.grow_lock.lock().await;
                if self.slots.opened() < self.config.max_connections {
                    return self.open_connection().await;
                }
            }

            tokio::select! {
                biased;
                permit = self.available.acquire() => {
                    permit.map_err(|_| DriverError::NoConnectionsAvailable)?.forget();
                    if let Some(conn) = self.idle.lock().pop_front() {
                        return Ok(conn);
                    }
                }
                _ = freed => {}
            }
        }
    }

    /// 연결 반환
    ///
    /// `None` 반환은 아무 일도 하지 않습니다. 버퍼가 가득 찼고 열린 연결이
    /// `min_connections` 보다 많으면 연결을 닫습니다. 닫기 실패는 호출자에게
    /// 전달됩니다.
    pub async fn release(
        &self,
        conn: impl Into<Option<PooledConnection<C::Connection>>>,
    ) -> DriverResult<()> {
        let Some(mut conn) = conn.into() else {
            return Ok(());
        };

        if conn.is_broken() || !self.is_open() {
            return self.discard(conn).await;
        }

        conn.mark_idle();
        let conn = match self.try_put(conn) {
            Ok(()) => return Ok(()),
            Err(conn) => conn,
        };

        let _grow = self.grow_lock.lock().await;
        if self.slots.opened() <= self.config.min_connections {
            tracing::warn!(
                connection_id = conn.id(),
                opened = self.slots.opened(),
                "idle buffer full at minimum size, keeping connection buffered"
            );
            self.force_put(conn);
            return Ok(());
        }

        self.close_connection(conn).await
    }

    /// 풀 닫기
    ///
    /// 대기 중인 획득은 `NoConnectionsAvailable` 로 끝나고 유휴 연결은 모두
    /// 닫힙니다.
    pub async fn close(&self) -> DriverResult<()> {
        {
            let mut open = self.open.write();
            if !*open {
                return Ok(());
            }
            *open = false;
        }

        self.available.close();
        self.slots.freed.notify_waiters();

        let drained: Vec<_> = self.idle.lock().drain(..).collect();
        let mut first_error = None;
        for conn in drained {
            if let Err(e) = self.close_connection(conn).await {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// 메트릭 조회
    pub fn metrics(&self) -> PoolMetrics {
        let opened = self.size();
        let idle = self.idle_count();

        PoolMetrics {
            opened,
            idle,
            in_use: opened.saturating_sub(idle),
            total_acquisitions: self.total_acquisitions.load(Ordering::Relaxed),
            total_created: self.total_created.load(Ordering::Relaxed),
            total_closed: self.total_closed.load(Ordering::Relaxed),
        }
    }

    /// 열린 연결 수
    pub fn size(&self) -> usize {
        self.slots.opened()
    }

    /// 유휴 연결 수
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// 풀 설정
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// 열린 상태 확인
    pub fn is_open(&self) -> bool {
        *self.open.read()
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(DriverError::pool("pool is closed"))
        }
    }

    /// 새 연결 생성
    async fn open_connection(&self) -> DriverResult<PooledConnection<C::Connection>> {
        let inner = self.connector.connect().await?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.total_created.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(connection_id = id, "connection opened");

        Ok(PooledConnection::new(id, inner, self.slots.clone()))
    }

    /// 유휴 버퍼에서 대기 없이 가져오기
    fn try_take(&self) -> Option<PooledConnection<C::Connection>> {
        let permit = self.available.try_acquire().ok()?;
        permit.forget();
        self.idle.lock().pop_front()
    }

    /// 유휴 버퍼에 대기 없이 넣기 (가득 차면 돌려줌)
    fn try_put(
        &self,
        conn: PooledConnection<C::Connection>,
    ) -> Result<(), PooledConnection<C::Connection>> {
        let mut idle = self.idle.lock();
        if idle.len() >= self.config.max_connections {
            return Err(conn);
        }
        idle.push_back(conn);
        drop(idle);

        self.available.add_permits(1);
        Ok(())
    }

    /// 용량과 무관하게 유휴 버퍼에 넣기
    fn force_put(&self, conn: PooledConnection<C::Connection>) {
        self.idle.lock().push_back(conn);
        self.available.add_permits(1);
    }

    async fn close_connection(&self, mut conn: PooledConnection<C::Connection>) -> DriverResult<()> {
        let result = conn.close().await;
        self.total_closed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(connection_id = conn.id(), "connection closed");
        result
    }

    /// 재사용할 수 없는 연결 정리 (닫기 실패는 무시)
    async fn discard(&self, conn: PooledConnection<C::Connection>) -> DriverResult<()> {
        let _grow = self.grow_lock.lock().await;
        let id = conn.id();
        if let Err(e) = self.close_connection(conn).await {
            tracing::debug!(connection_id = id, error = %e, "closing discarded connection failed");
        }
        Ok(())
    }
}

impl<C: Connector> std::fmt::Debug for ConnectionPool<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("config", &self.config)
            .field("opened", &self.size())
            .field("idle", &self.idle_count())
            .field("open", &self.is_open())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{MockConnection, MockConnector};

    async fn create_test_pool(min: usize, max: usize) -> (Arc<ConnectionPool<MockConnector>>, MockConnector) {
        let connector = MockConnector::echo();
        let config = PoolConfig::builder()
            .min_connections(min)
            .max_connections(max)
            .build();
        let pool = ConnectionPool::new(connector.clone(), config).await.unwrap();
        (Arc::new(pool), connector)
    }

    #[test]
    fn test_pool_config_default() {
        let config = PoolConfig::default();
        assert_eq!(config.min_connections, 3);
        assert_eq!(config.max_connections, 5);
        assert!(config.acquire_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pool_config_builder() {
        let config = PoolConfig::builder()
            .min_connections(2)
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(10))
            .build();

        assert_eq!(config.min_connections, 2);
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.acquire_timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_pool_config_validation() {
        let config = PoolConfig::builder().min_connections(6).max_connections(5).build();
        assert!(matches!(config.validate(), Err(DriverError::Configuration(_))));

        let config = PoolConfig::builder().min_connections(0).max_connections(0).build();
        assert!(matches!(config.validate(), Err(DriverError::Configuration(_))));

        let config = PoolConfig::builder().min_connections(0).max_connections(1).build();
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_pool_rejects_invalid_config() {
        let config = PoolConfig::builder().min_connections(4).max_connections(2).build();
        let result = ConnectionPool::new(MockConnector::echo(), config).await;
        assert!(matches!(result, Err(DriverError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_pool_warmup() {
        let (pool, connector) = create_test_pool(3, 5).await;

        assert_eq!(pool.size(), 3);
        assert_eq!(pool.idle_count(), 3);
        assert_eq!(connector.dialed(), 3);

        let metrics = pool.metrics();
        assert_eq!(metrics.in_use, 0);
        assert_eq!(metrics.total_created, 3);
    }

    #[tokio::test]
    async fn test_pool_warmup_failures_are_swallowed() {
        let connector = MockConnector::echo();
        connector.fail_next_dials(2);

        let pool = ConnectionPool::new(connector.clone(), PoolConfig::default())
            .await
            .unwrap();

        assert_eq!(pool.size(), 1);
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn test_pool_acquire_prefers_idle() {
        let (pool, connector) = create_test_pool(3, 5).await;
        let cancel = CancellationToken::new();

        let conn = pool.acquire(&cancel).await.unwrap();
        assert_eq!(conn.state(), ConnectionState::InUse);
        assert_eq!(conn.connection().id, 1);
        assert_eq!(connector.dialed(), 3);
        assert_eq!(pool.idle_count(), 2);
        assert_eq!(pool.size(), 3);

        pool.release(conn).await.unwrap();
        assert_eq!(pool.idle_count(), 3);
        assert_eq!(pool.metrics().total_acquisitions, 1);
    }

    #[tokio::test]
    async fn test_pool_grows_to_max() {
        let (pool, connector) = create_test_pool(3, 5).await;
        let cancel = CancellationToken::new();

        let mut conns = Vec::new();
        for _ in 0..5 {
            conns.push(pool.acquire(&cancel).await.unwrap());
        }

        assert_eq!(pool.size(), 5);
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(connector.dialed(), 5);
        assert_eq!(pool.metrics().in_use, 5);

        for conn in conns {
            pool.release(conn).await.unwrap();
        }
        assert_eq!(pool.size(), 5);
        assert_eq!(pool.idle_count(), 5);
    }

    #[tokio::test]
    async fn test_pool_growth_dial_failure_surfaces() {
        let (pool, connector) = create_test_pool(1, 2).await;
        let cancel = CancellationToken::new();

        let _first = pool.acquire(&cancel).await.unwrap();
        connector.fail_next_dials(1);

        let err = pool.acquire(&cancel).await.unwrap_err();
        assert!(matches!(err, DriverError::Transport(_)));
        assert_eq!(pool.size(), 1);
    }

    #[tokio::test]
    async fn test_pool_acquire_blocks_until_release() {
        let (pool, _connector) = create_test_pool(3, 5).await;
        let cancel = CancellationToken::new();

        let mut conns = Vec::new();
        for _ in 0..5 {
            conns.push(pool.acquire(&cancel).await.unwrap());
        }

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire(&CancellationToken::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        let released = conns.pop().unwrap();
        let released_id = released.id();
        pool.release(released).await.unwrap();

        let conn = waiter.await.unwrap().unwrap();
        assert_eq!(conn.id(), released_id);
        assert_eq!(pool.size(), 5);
    }

    #[tokio::test]
    async fn test_pool_acquire_cancel() {
        let (pool, _connector) = create_test_pool(1, 1).await;
        let cancel = CancellationToken::new();

        let held = pool.acquire(&cancel).await.unwrap();

        let waiter_cancel = CancellationToken::new();
        let waiter = {
            let pool = pool.clone();
            let token = waiter_cancel.clone();
            tokio::spawn(async move { pool.acquire(&token).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        waiter_cancel.cancel();

        let err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(err, DriverError::Canceled));
        assert_eq!(pool.size(), 1);

        pool.release(held).await.unwrap();
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn test_pool_acquire_already_canceled() {
        let (pool, _connector) = create_test_pool(1, 1).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(matches!(pool.acquire(&cancel).await, Err(DriverError::Canceled)));
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_acquire_timeout() {
        let config = PoolConfig::builder()
            .min_connections(1)
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .build();
        let pool = ConnectionPool::new(MockConnector::echo(), config).await.unwrap();
        let cancel = CancellationToken::new();

        let _held = pool.acquire(&cancel).await.unwrap();
        let err = pool.acquire(&cancel).await.unwrap_err();
        assert!(matches!(err, DriverError::Timeout(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_contention_never_exceeds_max() {
        let (pool, connector) = create_test_pool(3, 5).await;
        let peak = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..64 {
            let pool = pool.clone();
            let peak = peak.clone();
            tasks.push(tokio::spawn(async move {
                let cancel = CancellationToken::new();
                for _ in 0..50 {
                    let conn = pool.acquire(&cancel).await.unwrap();
                    peak.fetch_max(pool.size(), Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    pool.release(conn).await.unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 5);
        assert!(connector.dialed() <= 5);

        let metrics = pool.metrics();
        assert_eq!(metrics.in_use, 0);
        assert_eq!(metrics.idle, metrics.opened);
        assert_eq!(metrics.total_acquisitions, 64 * 50);
    }

    #[tokio::test]
    async fn test_pool_release_none_is_noop() {
        let (pool, connector) = create_test_pool(2, 2).await;
        pool.release(None).await.unwrap();

        assert_eq!(pool.size(), 2);
        assert_eq!(pool.idle_count(), 2);
        assert_eq!(connector.closed(), 0);
    }

    #[tokio::test]
    async fn test_pool_release_broken_closes() {
        let (pool, connector) = create_test_pool(2, 3).await;
        let cancel = CancellationToken::new();

        let mut conn = pool.acquire(&cancel).await.unwrap();
        conn.mark_broken();
        pool.release(conn).await.unwrap();

        assert_eq!(pool.size(), 1);
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(connector.closed(), 1);
        assert_eq!(pool.metrics().total_closed, 1);
    }

    #[tokio::test]
    async fn test_pool_release_full_buffer_above_min_closes() {
        let (pool, connector) = create_test_pool(1, 2).await;
        let cancel = CancellationToken::new();

        let a = pool.acquire(&cancel).await.unwrap();
        let b = pool.acquire(&cancel).await.unwrap();
        // past max, only reachable from inside the pool
        let c = pool.open_connection().await.unwrap();
        assert_eq!(pool.size(), 3);

        pool.release(a).await.unwrap();
        pool.release(b).await.unwrap();
        assert_eq!(pool.idle_count(), 2);

        pool.release(c).await.unwrap();
        assert_eq!(pool.size(), 2);
        assert_eq!(pool.idle_count(), 2);
        assert_eq!(connector.closed(), 1);
    }

    #[tokio::test]
    async fn test_pool_release_close_failure_propagates() {
        let (pool, connector) = create_test_pool(1, 1).await;
        let cancel = CancellationToken::new();

        let a = pool.acquire(&cancel).await.unwrap();
        let b = pool.open_connection().await.unwrap();
        pool.release(a).await.unwrap();

        connector.fail_close(true);
        let err = pool.release(b).await.unwrap_err();
        assert!(matches!(err, DriverError::Transport(_)));
        assert_eq!(pool.size(), 1);
    }

    #[tokio::test]
    async fn test_pool_release_full_buffer_at_min_rebuffers() {
        let (pool, connector) = create_test_pool(1, 1).await;

        // connection the pool does not count
        let (inner, _) = MockConnection::scripted(Vec::new());
        let stray = PooledConnection::new(99, inner, Arc::new(Slots::default()));

        pool.release(stray).await.unwrap();
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.idle_count(), 2);
        assert_eq!(connector.closed(), 0);
    }

    #[tokio::test]
    async fn test_pool_dropped_handle_frees_slot() {
        let (pool, connector) = create_test_pool(1, 1).await;
        let cancel = CancellationToken::new();

        let held = pool.acquire(&cancel).await.unwrap();
        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire(&CancellationToken::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(held);
        let conn = waiter.await.unwrap().unwrap();
        assert_eq!(conn.id(), 2);
        assert_eq!(connector.dialed(), 2);
        assert_eq!(pool.size(), 1);
    }

    #[tokio::test]
    async fn test_pool_close() {
        let (pool, connector) = create_test_pool(2, 2).await;
        let cancel = CancellationToken::new();

        let a = pool.acquire(&cancel).await.unwrap();
        let _b = pool.acquire(&cancel).await.unwrap();
        pool.release(a).await.unwrap();
        let _c = pool.acquire(&cancel).await.unwrap();

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire(&CancellationToken::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        pool.close().await.unwrap();
        let err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(err, DriverError::NoConnectionsAvailable));

        assert!(matches!(pool.acquire(&cancel).await, Err(DriverError::Pool(_))));
        assert!(!pool.is_open());
        assert_eq!(connector.closed(), 0);
    }

    #[tokio::test]
    async fn test_pool_close_closes_idle_and_late_releases() {
        let (pool, connector) = create_test_pool(2, 2).await;
        let cancel = CancellationToken::new();

        let held = pool.acquire(&cancel).await.unwrap();
        pool.close().await.unwrap();
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(connector.closed(), 1);

        pool.release(held).await.unwrap();
        assert_eq!(connector.closed(), 2);
        assert_eq!(pool.size(), 0);
    }
}
