//! 单个文档处理器 - 编排层
//!
//! ## 职责
//!
//! 驱动一份文档的完整解析：逐行推进游标，按优先级尝试
//! 区块标题 → 题组引言 → 题目识别，把候选题送去去重、分配图片、格式化。
//!
//! ## 保证
//!
//! - 每轮循环游标至少前进一行，任意输入都能结束
//! - 不做 I/O，不会失败，异常输入只会变成丢弃统计
//! - 所有可变状态都在 `DocumentCtx` 中，多份文档可并行处理

use std::sync::Arc;

use tracing::{debug, info};

use crate::models::paragraph::ParagraphStream;
use crate::models::question::{CanonicalQuestionRecord, DropReason, QuestionCandidate};
use crate::models::subject::SubjectFamily;
use crate::recognizers::{recognizer_for, Outcome, QuestionRecognizer};
use crate::services::dedup::DedupFilter;
use crate::services::image_resolver::{ImageNaming, ImagePathGenerator, ImageResolver};
use crate::services::metadata_resolver::resolve_metadata;
use crate::utils::logging::truncate_text;
use crate::workflow::document_ctx::{DocumentCtx, ExtractionStats};
use crate::workflow::record_formatter::RecordFormatter;
use crate::workflow::section_tracker::SectionTransition;

/// 日志中题干的最大显示长度
const LOG_PREVIEW_CHARS: usize = 30;

/// 抽取选项
#[derive(Clone)]
pub struct ExtractOptions {
    /// 文档内按题干去重
    pub deduplicate: bool,
    pub image_generator: Arc<dyn ImagePathGenerator>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            deduplicate: true,
            image_generator: ImageNaming::Flat.generator("png"),
        }
    }
}

/// 一份文档的抽取结果
#[derive(Debug, Clone)]
pub struct DocumentExtraction {
    pub records: Vec<CanonicalQuestionRecord>,
    pub stats: ExtractionStats,
}

/// 单个文档处理器，持有学科识别器，可重复用于多份文档
pub struct DocumentProcessor {
    recognizer: Box<dyn QuestionRecognizer>,
    options: ExtractOptions,
}

impl DocumentProcessor {
    pub fn new(recognizer: Box<dyn QuestionRecognizer>, options: ExtractOptions) -> Self {
        Self {
            recognizer,
            options,
        }
    }

    pub fn for_family(family: SubjectFamily, options: ExtractOptions) -> Self {
        Self::new(recognizer_for(family), options)
    }

    pub fn family(&self) -> SubjectFamily {
        self.recognizer.family()
    }

    /// 处理一份文档
    ///
    /// # 参数
    /// - `source_path`: 文档路径，用于解析元数据和生成图片路径
    /// - `stream`: 文档的段落流
    pub fn process(&self, source_path: &str, stream: &ParagraphStream) -> DocumentExtraction {
        let recognizer = self.recognizer.as_ref();
        let formatter = RecordFormatter::new(resolve_metadata(source_path), recognizer.formats_math());
        let image_resolver = ImageResolver::new(
            recognizer.image_keywords(),
            self.options.image_generator.clone(),
        );
        let mut ctx = DocumentCtx::new(source_path);
        let mut dedup = DedupFilter::default();
        let mut records = Vec::new();

        let mut cursor = 0;
        while cursor < stream.len() {
            let line = stream.trimmed(cursor);
            let next = if line.is_empty() {
                cursor + 1
            } else if let Some(transition) = recognizer.section_transition(line, ctx.section.current()) {
                ctx.apply_section(transition.clone());
                if let SectionTransition::Enter(label) = &transition {
                    debug!("{} 进入区块: {}", ctx, label);
                    recognizer.on_section_enter(label, &mut ctx);
                }
                cursor + 1
            } else if recognizer.requires_section() && !ctx.section.is_active() {
                cursor + 1
            } else if let Some(intro) = recognizer.group_intro(line, &ctx) {
                let id = ctx.groups.open(intro);
                debug!("{} 开启题组 {}", ctx, id);
                cursor + 1
            } else {
                let recognition = recognizer.recognize(stream, cursor, &mut ctx);
                match recognition.outcome {
                    Outcome::Candidate(mut candidate) => {
                        if self.options.deduplicate && !dedup.admit(&candidate.question_text) {
                            log_drop(&ctx, cursor, DropReason::Duplicate, &candidate.question_text);
                            ctx.stats.record_drop(DropReason::Duplicate);
                        } else {
                            attach_image(&mut candidate, &image_resolver, &mut ctx);
                            if let Some(group_id) = candidate.group_id {
                                ctx.groups.note_member(group_id);
                            }
                            records.push(formatter.format(candidate));
                            ctx.stats.emitted += 1;
                        }
                    }
                    Outcome::Dropped(reason) => {
                        log_drop(&ctx, cursor, reason, line);
                        ctx.stats.record_drop(reason);
                    }
                    Outcome::Skipped => {}
                }
                recognition.next
            };

            // 游标严格递增
            cursor = next.max(cursor + 1);
        }

        ctx.stats.lines = stream.len();
        info!(
            "{} ✓ 输出 {} 题，丢弃 {} 题（共 {} 行）",
            ctx,
            ctx.stats.emitted,
            ctx.stats.dropped_total(),
            ctx.stats.lines
        );

        DocumentExtraction {
            records,
            stats: ctx.stats,
        }
    }
}

/// 用默认选项抽取一份文档
pub fn extract_document(
    source_path: &str,
    stream: &ParagraphStream,
    family: SubjectFamily,
) -> DocumentExtraction {
    DocumentProcessor::for_family(family, ExtractOptions::default()).process(source_path, stream)
}

/// 题干自身引用图片时分配新图片，否则沿用题组引言的图片
fn attach_image(candidate: &mut QuestionCandidate, resolver: &ImageResolver, ctx: &mut DocumentCtx) {
    // 引言在文档中先于子题出现，先为引言分配
    let group_image = candidate
        .group_id
        .and_then(|group_id| group_image(group_id, resolver, ctx));
    let own_image = resolver.resolve(&candidate.question_text, &ctx.source_path, &mut ctx.images);
    candidate.image_path = own_image.or(group_image);
}

fn group_image(group_id: u32, resolver: &ImageResolver, ctx: &mut DocumentCtx) -> Option<String> {
    let DocumentCtx {
        groups,
        images,
        source_path,
        ..
    } = ctx;
    let group = groups.current_mut().filter(|group| group.id == group_id)?;
    if group.members == 0 && group.image_path.is_none() {
        group.image_path = resolver.resolve(&group.intro, source_path, images);
    }
    group.image_path.clone()
}

fn log_drop(ctx: &DocumentCtx, cursor: usize, reason: DropReason, text: &str) {
    debug!(
        "{} 第 {} 行丢弃（{}）: {}",
        ctx,
        cursor + 1,
        reason,
        truncate_text(text, LOG_PREVIEW_CHARS)
    );
}
