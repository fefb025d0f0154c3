use std::env;
use std::fs;

/// Resolves the name of the host the produced files live on.
pub trait HostResolver: Send + Sync {
    fn hostname(&self) -> String;
}

/// Reads the hostname from the running system on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostResolver for SystemHost {
    fn hostname(&self) -> String {
        env::var("HOSTNAME")
            .ok()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| {
                fs::read_to_string("/proc/sys/kernel/hostname")
                    .or_else(|_| fs::read_to_string("/etc/hostname"))
                    .ok()
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
            })
            .unwrap_or_else(|| "localhost".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedHost(pub String);

impl FixedHost {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl HostResolver for FixedHost {
    fn hostname(&self) -> String {
        self.0.clone()
    }
}
