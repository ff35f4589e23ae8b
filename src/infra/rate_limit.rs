use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::{Script, aio::ConnectionManager};

use super::InfraError;
use crate::app_error::{AppError, AppResult};

#[async_trait]
pub trait RateLimiterTrait: Send + Sync {
    /// Ok(()) if the client is within its budget, Err(AppError::RateLimited) otherwise.
    async fn check(&self, ip: &str) -> AppResult<()>;
}

/// Lua script for atomic increment with TTL.
/// Returns the new count after increment.
/// If the key exists but has no TTL, the TTL is set again.
const INCR_WITH_TTL_SCRIPT: &str = r#"
local current = redis.call('INCR', KEYS[1])
if current == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
elseif redis.call('TTL', KEYS[1]) == -1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return current
"#;

/// Redis-backed fixed-window limiter, shared across processes.
#[derive(Clone)]
pub struct RedisRateLimiter {
    manager: ConnectionManager,
    window_secs: u64,
    max_per_ip: u64,
    script: Script,
}

impl RedisRateLimiter {
    pub async fn new(redis_url: &str, window_secs: u64, max_per_ip: u64) -> Result<Self, InfraError> {
        let client = redis::Client::open(redis_url).map_err(InfraError::RedisConnection)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(InfraError::RedisConnection)?;
        Ok(Self {
            manager,
            window_secs,
            max_per_ip,
            script: Script::new(INCR_WITH_TTL_SCRIPT),
        })
    }
}

#[async_trait]
impl RateLimiterTrait for RedisRateLimiter {
    async fn check(&self, ip: &str) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let current: u64 = self
            .script
            .key(format!("rate:ip:{ip}"))
            .arg(self.window_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if current > self.max_per_ip {
            return Err(AppError::RateLimited);
        }
        Ok(())
    }
}

/// Process-local fixed-window limiter, used when no Redis is configured.
pub struct LocalRateLimiter {
    window: Duration,
    max_per_ip: u64,
    counters: Mutex<HashMap<String, (Instant, u64)>>,
}

impl LocalRateLimiter {
    pub fn new(window_secs: u64, max_per_ip: u64) -> Self {
        Self {
            window: Duration::from_secs(window_secs),
            max_per_ip,
            counters: Mutex::new(HashMap::new()),
        }
    }

    fn bump(&self, ip: &str, now: Instant) -> AppResult<()> {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        // Drop expired windows so the map does not grow without bound.
        counters.retain(|_, (started, _)| now.duration_since(*started) < self.window);

        let (_, count) = counters.entry(ip.to_string()).or_insert((now, 0));
        *count += 1;
        if *count > self.max_per_ip {
            return Err(AppError::RateLimited);
        }
        Ok(())
    }
}

#[async_trait]
impl RateLimiterTrait for LocalRateLimiter {
    async fn check(&self, ip: &str) -> AppResult<()> {
        self.bump(ip, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_limiter_blocks_after_budget() {
        let limiter = LocalRateLimiter::new(60, 2);
        let now = Instant::now();
        assert!(limiter.bump("1.1.1.1", now).is_ok());
        assert!(limiter.bump("1.1.1.1", now).is_ok());
        assert!(matches!(
            limiter.bump("1.1.1.1", now),
            Err(AppError::RateLimited)
        ));
        // Other clients have their own budget.
        assert!(limiter.bump("2.2.2.2", now).is_ok());
    }

    #[test]
    fn local_limiter_resets_after_window() {
        let limiter = LocalRateLimiter::new(60, 1);
        let start = Instant::now();
        assert!(limiter.bump("1.1.1.1", start).is_ok());
        assert!(limiter.bump("1.1.1.1", start).is_err());

        let later = start + Duration::from_secs(61);
        assert!(limiter.bump("1.1.1.1", later).is_ok());
    }

    #[tokio::test]
    async fn local_limiter_implements_trait() {
        let limiter: Box<dyn RateLimiterTrait> = Box::new(LocalRateLimiter::new(60, 1));
        assert!(limiter.check("ip").await.is_ok());
        assert!(limiter.check("ip").await.is_err());
    }
}
