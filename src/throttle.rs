//! Failed admin logins counted per client address in Redis.

use std::net::IpAddr;

use rocket_db_pools::deadpool_redis;
use rocket_db_pools::deadpool_redis::redis::AsyncCommands;

pub const MAX_LOGIN_FAILURES: i64 = 5;

/// Without a pool every check passes and failures are not recorded.
#[derive(Clone, Default)]
pub struct LoginThrottle {
    pool: Option<deadpool_redis::Pool>,
}

/// IPv6 clients are grouped by their /64, since one host usually owns the
/// whole prefix.
pub fn client_key(client_ip: Option<IpAddr>) -> String {
    let ip = match client_ip {
        Some(IpAddr::V4(ip4)) => ip4.to_string(),
        Some(IpAddr::V6(ip6)) => {
            let ipb = ip6.segments();
            format!(
                "{:04x}:{:04x}:{:04x}:{:04x}::/64",
                ipb[0], ipb[1], ipb[2], ipb[3]
            )
        }
        None => "unknown".to_string(),
    };
    format!("admin-login:{ip}")
}

impl LoginThrottle {
    pub fn disabled() -> Self {
        LoginThrottle { pool: None }
    }

    pub fn redis(pool: deadpool_redis::Pool) -> Self {
        LoginThrottle { pool: Some(pool) }
    }

    async fn connection(&self) -> Option<deadpool_redis::Connection> {
        let pool = self.pool.as_ref()?;
        match pool.get().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                tracing::warn!(error = %e, "redis unavailable, login throttle skipped");
                None
            }
        }
    }

    pub async fn is_blocked(&self, client_ip: Option<IpAddr>) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        let key = client_key(client_ip);
        match conn.get::<_, Option<i64>>(&key).await {
            Ok(failures) => failures.unwrap_or(0) >= MAX_LOGIN_FAILURES,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read login failures");
                false
            }
        }
    }

    /// Counts one failure; the counter expires a day after the latest one.
    pub async fn record_failure(&self, client_ip: Option<IpAddr>) {
        let Some(mut conn) = self.connection().await else {
            return;
        };
        let key = client_key(client_ip);
        match conn.incr::<_, _, i64>(&key, 1).await {
            Ok(failures) => {
                tracing::warn!(client = %key, failures, "admin login failed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to record login failure");
                return;
            }
        }
        if let Err(e) = conn.expire::<_, ()>(&key, 86_400).await {
            tracing::warn!(error = %e, "failed to set login failure expiry");
        }
    }

    pub async fn clear(&self, client_ip: Option<IpAddr>) {
        let Some(mut conn) = self.connection().await else {
            return;
        };
        if let Err(e) = conn.del::<_, ()>(client_key(client_ip)).await {
            tracing::warn!(error = %e, "failed to clear login failures");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv6_clients_share_their_prefix() {
        let a: IpAddr = "2001:db8:1:2::10".parse().unwrap();
        let b: IpAddr = "2001:db8:1:2:ffff::1".parse().unwrap();
        assert_eq!(client_key(Some(a)), client_key(Some(b)));
        assert_eq!(client_key(Some(a)), "admin-login:2001:0db8:0001:0002::/64");
    }

    #[test]
    fn ipv4_clients_are_keyed_by_address() {
        let ip: IpAddr = "192.0.2.7".parse().unwrap();
        assert_eq!(client_key(Some(ip)), "admin-login:192.0.2.7");
        assert_eq!(client_key(None), "admin-login:unknown");
    }

    #[rocket::async_test]
    async fn disabled_throttle_never_blocks() {
        let throttle = LoginThrottle::disabled();
        throttle.record_failure(None).await;
        assert!(!throttle.is_blocked(None).await);
    }
}
