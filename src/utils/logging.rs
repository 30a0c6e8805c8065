/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use crate::config::Config;
use crate::orchestrator::BatchStats;
use crate::workflow::ExtractionStats;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 默认 `info`，可用 `RUST_LOG` 覆盖；`verbose` 为 true 时默认 `debug`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 试卷题目抽取");
    info!("📂 输入目录: {}", config.input_folder);
    info!("📂 输出目录: {}", config.output_folder);
    info!("📊 最大并发数: {}", config.max_concurrent_documents);
    if let Some(subject) = &config.subject {
        info!("📚 指定科目: {}", subject);
    }
    info!("{}", "=".repeat(60));
}

/// 记录文档加载信息
///
/// # 参数
/// - `total`: 文档总数
/// - `max_concurrent`: 最大并发数
pub fn log_documents_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的文档", total);
    info!("📋 最多同时处理 {} 个\n", max_concurrent);
}

/// 记录单个文档完成信息
pub fn log_document_complete(document_index: usize, stats: &ExtractionStats) {
    info!(
        "[文档 {}] ✓ 完成: 输出 {} 题，丢弃 {} 题",
        document_index,
        stats.emitted,
        stats.dropped_total()
    );
    for (reason, count) in stats.drops() {
        info!("[文档 {}]   - {}: {}", document_index, reason, count);
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `stats`: 批量处理统计
/// - `output_folder`: 结果输出目录
pub fn print_final_stats(stats: &BatchStats, output_folder: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.success, stats.total);
    info!("❌ 失败: {}", stats.failed);
    info!("⏭️ 跳过: {}", stats.skipped);
    info!("📝 题目: {}（丢弃 {}）", stats.questions, stats.dropped);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output_folder);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("下列何者正確", 3), "下列何...");
        assert_eq!(truncate_text("short", 10), "short");
    }
}
