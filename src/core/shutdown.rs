//! Ctrl-C 处理
//!
//! 进程启动时安装一次监听：第一次 Ctrl-C 触发取消令牌，正在进行的查词、等待中的输入和建卡都会被放弃；
//! 第二次 Ctrl-C 直接退出进程。

use tokio_util::sync::CancellationToken;

/// 进程被第二次 Ctrl-C 终止时的退出码（128 + SIGINT）
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// 安装进程级 Ctrl-C 监听，返回供会话使用的取消令牌
pub fn install_ctrl_c_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("Cannot listen for Ctrl+C");
            return;
        }
        tracing::info!("Received Ctrl+C, cancelling...");
        trigger.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!();
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_starts_uncancelled() {
        let token = install_ctrl_c_handler();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }
}
