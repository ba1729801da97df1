//! 本机地址命令
//!
//! 列出本机 IPv4 地址，帮助选择与控制器同网段的监听地址。

use anyhow::{Context, Result};
use ur_driver::{list_local_addresses, primary_address};

pub fn execute() -> Result<()> {
    let addrs = list_local_addresses().context("枚举网卡地址失败")?;
    if addrs.is_empty() {
        println!("(没有 IPv4 地址)");
        return Ok(());
    }

    let primary = primary_address(&addrs);
    for addr in &addrs {
        let marker = if Some(addr) == primary { "*" } else { " " };
        println!("{} {}", marker, addr);
    }
    Ok(())
}
