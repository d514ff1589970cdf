//! Document-to-skill-pack compile: text in, [`CompiledPack`] out.
//!
//! Single-threaded and synchronous. The same sources and config always
//! produce the same pack.

use tracing::{debug, info, instrument, warn};

use skillpack_shared::{
    CompileConfig, CompiledPack, Result, SkillPackError, SourceDocument, sanitize_name,
};
use skillpack_text::{Lexicon, chunk_blocks, normalize, resolve_language, split_blocks};

use crate::graph::build_graph;
use crate::item::build_item;

/// Concatenate source documents into one text blob.
///
/// Blank documents are skipped. A single remaining document passes through
/// untouched; several are joined under `## Source: <name>` headers.
pub fn join_sources(sources: &[SourceDocument]) -> String {
    let docs: Vec<&SourceDocument> = sources
        .iter()
        .filter(|doc| {
            let blank = doc.text.trim().is_empty();
            if blank {
                warn!(source = %doc.name, "source yielded no text, skipping");
            }
            !blank
        })
        .collect();

    match docs.as_slice() {
        [single] => single.text.clone(),
        many => many
            .iter()
            .map(|doc| format!("## Source: {}\n\n{}", doc.name, doc.text))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

/// Compile source documents into a skill pack.
///
/// Fails with `InputNotFound` for an empty source list, `InvalidName` when
/// the name has no usable characters, `EmptyExtraction` when the text
/// normalizes to nothing, and `NoSemanticContent` when no block or chunk
/// survives the length filters.
pub fn compile(
    sources: &[SourceDocument],
    config: &CompileConfig,
    lexicon: &Lexicon,
) -> Result<CompiledPack> {
    compile_with(sources, config, lexicon, |_, _| {})
}

/// [`compile`] with a callback invoked after each item is built
/// (`current`, `total`), for progress display.
#[instrument(skip_all, fields(name = %config.skill_name, sources = sources.len()))]
pub fn compile_with(
    sources: &[SourceDocument],
    config: &CompileConfig,
    lexicon: &Lexicon,
    mut on_item: impl FnMut(usize, usize),
) -> Result<CompiledPack> {
    config.validate()?;

    if sources.is_empty() {
        return Err(SkillPackError::InputNotFound {
            input: "no source documents supplied".into(),
        });
    }

    let name = sanitize_name(&config.skill_name);
    if name.is_empty() {
        return Err(SkillPackError::InvalidName {
            name: config.skill_name.clone(),
        });
    }

    let normalized = normalize(&join_sources(sources));
    if normalized.is_empty() {
        return Err(SkillPackError::EmptyExtraction);
    }

    let blocks = split_blocks(&normalized);
    if blocks.is_empty() {
        return Err(SkillPackError::no_semantic_content(
            "no paragraph reached 40 non-whitespace characters",
        ));
    }

    let chunks = chunk_blocks(&blocks, config.max_chunks);
    if chunks.is_empty() {
        return Err(SkillPackError::no_semantic_content(
            "no chunk exceeded 80 non-whitespace characters",
        ));
    }
    debug!(blocks = blocks.len(), chunks = chunks.len(), "text segmented");

    let total = chunks.len();
    let items: Vec<_> = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let item = build_item(i + 1, chunk, config.language, lexicon);
            on_item(i + 1, total);
            item
        })
        .collect();

    let edges = build_graph(&items);
    let language = resolve_language(config.language, &normalized);

    info!(
        %name,
        items = items.len(),
        edges = edges.len(),
        %language,
        "pack compiled"
    );

    Ok(CompiledPack {
        name,
        items,
        edges,
        language,
        min_score: config.min_score,
        source_count: sources.len(),
        source_text: normalized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillpack_shared::LanguageMode;

    fn config(name: &str) -> CompileConfig {
        CompileConfig {
            skill_name: name.into(),
            ..CompileConfig::default()
        }
    }

    fn doc(text: &str) -> Vec<SourceDocument> {
        vec![SourceDocument::new("manual.pdf", text)]
    }

    const VALVE_DOC: &str = "Valve maintenance procedure for the primary cooling loop.\n\
        1. Open the valve slowly\n\
        2. Check the pressure gauge\n\
        if pressure exceeds limit then shut down the pump.\n\n\
        Pump inspection guidelines cover the pump housing, the pump seal and the pressure \
        relief valve. When the seal leaks, replace the seal before restarting the pump.";

    #[test]
    fn join_sources_adds_headers() {
        let joined = join_sources(&[
            SourceDocument::new("a.txt", "alpha"),
            SourceDocument::new("empty.txt", " \n "),
            SourceDocument::new("b.txt", "beta"),
        ]);
        assert_eq!(joined, "## Source: a.txt\n\nalpha\n\n## Source: b.txt\n\nbeta");
    }

    #[test]
    fn join_single_source_passes_through() {
        assert_eq!(join_sources(&[SourceDocument::new("a.txt", "alpha")]), "alpha");
        assert_eq!(join_sources(&[SourceDocument::new("a.txt", "\t")]), "");
        assert_eq!(join_sources(&[]), "");
    }

    #[test]
    fn two_short_paragraphs_make_one_item() {
        let pack = compile(&doc(VALVE_DOC), &config("Valve Guide"), &Lexicon::builtin()).unwrap();

        assert_eq!(pack.name, "valve-guide");
        assert_eq!(pack.items.len(), 1);
        assert_eq!(pack.language, LanguageMode::En);
        assert_eq!(pack.min_score, 55);
        assert_eq!(pack.source_count, 1);

        let item = &pack.items[0];
        assert_eq!(item.id, "001");
        assert_eq!(item.title, "Valve maintenance procedure for the primar");
        assert!(item.steps.contains(&"Open the valve slowly".to_string()));
        assert!(
            item.conditions
                .contains(&"if pressure exceeds limit then shut down the pump".to_string())
        );
        assert!(item.content.contains("Pump inspection guidelines"));
    }

    #[test]
    fn long_paragraphs_split_into_two_items() {
        let para = |topic: &str| {
            (0..150)
                .map(|i| format!("{topic}{}", i % 7))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let text = format!("{}\n\n{}", para("valve"), para("pump"));
        let pack = compile(&doc(&text), &config("split"), &Lexicon::builtin()).unwrap();
        assert_eq!(pack.items.len(), 2);
        assert_eq!(pack.items[1].id, "002");
    }

    #[test]
    fn chunk_ceiling_is_respected() {
        let text = (0..30)
            .map(|i| {
                (0..150)
                    .map(|w| format!("topic{i}word{}", w % 11))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        let mut cfg = config("ceiling");
        cfg.max_chunks = 5;
        let pack = compile(&doc(&text), &cfg, &Lexicon::builtin()).unwrap();
        // 30 raw chunks, merged in batches of 6.
        let ids: Vec<&str> = pack.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["001", "002", "003", "004", "005"]);
    }

    #[test]
    fn short_paragraphs_are_no_semantic_content() {
        let text = "Too short.\n\nStill short.\n\nNope.";
        let err = compile(&doc(text), &config("x"), &Lexicon::builtin()).unwrap_err();
        assert!(matches!(err, SkillPackError::NoSemanticContent { .. }));
    }

    #[test]
    fn blank_text_is_empty_extraction() {
        let err = compile(&doc(" \r\n\t \u{00A0}"), &config("x"), &Lexicon::builtin()).unwrap_err();
        assert!(matches!(err, SkillPackError::EmptyExtraction));
    }

    #[test]
    fn no_sources_is_input_not_found() {
        let err = compile(&[], &config("x"), &Lexicon::builtin()).unwrap_err();
        assert!(matches!(err, SkillPackError::InputNotFound { .. }));
    }

    #[test]
    fn unusable_name_is_rejected() {
        let err = compile(&doc(VALVE_DOC), &config("***"), &Lexicon::builtin()).unwrap_err();
        assert!(matches!(err, SkillPackError::InvalidName { .. }));
    }

    #[test]
    fn invalid_config_is_rejected_first() {
        let mut cfg = config("valve");
        cfg.max_chunks = 0;
        let err = compile(&doc(VALVE_DOC), &cfg, &Lexicon::builtin()).unwrap_err();
        assert!(matches!(err, SkillPackError::Validation { .. }));
    }

    #[test]
    fn compile_is_deterministic() {
        let lexicon = Lexicon::builtin();
        let a = compile(&doc(VALVE_DOC), &config("valve"), &lexicon).unwrap();
        let b = compile(&doc(VALVE_DOC), &config("valve"), &lexicon).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn progress_callback_sees_every_item() {
        let mut seen = Vec::new();
        compile_with(&doc(VALVE_DOC), &config("valve"), &Lexicon::builtin(), |cur, total| {
            seen.push((cur, total))
        })
        .unwrap();
        assert_eq!(seen, vec![(1, 1)]);
    }

    #[test]
    fn compile_with_opens_its_own_span() {
        use std::sync::{Arc, Mutex};
        use tracing::span;
        use tracing_subscriber::layer::{Context, SubscriberExt};
        use tracing_subscriber::{Layer, Registry};

        #[derive(Clone, Default)]
        struct SpanNames(Arc<Mutex<Vec<&'static str>>>);

        impl<S: tracing::Subscriber> Layer<S> for SpanNames {
            fn on_new_span(&self, attrs: &span::Attributes<'_>, _id: &span::Id, _ctx: Context<'_, S>) {
                self.0.lock().unwrap().push(attrs.metadata().name());
            }
        }

        let names = SpanNames::default();
        let subscriber = Registry::default().with(names.clone());
        tracing::subscriber::with_default(subscriber, || {
            compile_with(&doc(VALVE_DOC), &config("valve"), &Lexicon::builtin(), |_, _| {})
                .unwrap();
        });
        assert!(names.0.lock().unwrap().contains(&"compile_with"));
    }

    #[test]
    fn chinese_document_uses_cjk_keywords() {
        let text = "阀门维护规程适用于一号冷却回路的全部设备和管道系统。\n\
                    1、缓慢打开阀门并记录压力读数\n\
                    如果压力超过上限请立即停机并通知值班人员。\n\n\
                    水泵检查要求包括泵壳、密封件与泄压阀的完整性检查与记录，\
                    检查结果必须由值班工程师签字确认后归档保存。";
        let pack = compile(&doc(text), &config("阀门 手册"), &Lexicon::builtin()).unwrap();
        assert_eq!(pack.name, "阀门-手册");
        assert_eq!(pack.language, LanguageMode::Zh);
        let item = &pack.items[0];
        assert!(item.steps.contains(&"缓慢打开阀门并记录压力读数".to_string()));
        assert!(!item.conditions.is_empty());
        assert!(item.keywords.iter().all(|k| k.chars().count() >= 2));
    }
}
