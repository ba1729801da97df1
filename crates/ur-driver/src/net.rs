//! 本机网络接口枚举
//!
//! 用于在多网卡主机上选择与机器人控制器同网段的监听地址。

use crate::error::DriverError;
use std::fmt;
use std::net::Ipv4Addr;

/// 一个本机 IPv4 地址
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalAddress {
    /// 网卡名（如 `eth0`、`en0`）
    pub interface: String,
    pub addr: Ipv4Addr,
}

impl LocalAddress {
    pub fn is_loopback(&self) -> bool {
        self.addr.is_loopback()
    }
}

impl fmt::Display for LocalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.interface, self.addr)
    }
}

/// 列出本机所有 IPv4 地址
///
/// 按系统返回的顺序，包含回环地址。
#[cfg(unix)]
pub fn list_local_addresses() -> Result<Vec<LocalAddress>, DriverError> {
    let interfaces = nix::ifaddrs::getifaddrs().map_err(std::io::Error::from)?;

    Ok(interfaces
        .filter_map(|ifa| {
            let sin = *ifa.address?.as_sockaddr_in()?;
            Some(LocalAddress {
                interface: ifa.interface_name,
                addr: *std::net::SocketAddrV4::from(sin).ip(),
            })
        })
        .collect())
}

#[cfg(not(unix))]
pub fn list_local_addresses() -> Result<Vec<LocalAddress>, DriverError> {
    Err(DriverError::Io(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "interface enumeration is only available on unix",
    )))
}

/// 第一个非回环地址
pub fn primary_address(addrs: &[LocalAddress]) -> Option<&LocalAddress> {
    addrs.iter().find(|a| !a.is_loopback())
}
