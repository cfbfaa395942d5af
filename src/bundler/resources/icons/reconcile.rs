//! Resolution-set reconciliation.
//!
//! Joins the app icon's tags against the template's, composites every match
//! concurrently, and makes sure the result carries [`IconTag::BIGGEST`].

use super::compositor::composite_encoded;
use super::container::IconMap;
use super::error::IconError;
use super::tag::IconTag;
use std::fmt;
use tokio::task::JoinSet;

/// Non-fatal outcome recorded while reconciling.
#[derive(Debug)]
pub enum ReconcileWarning {
    /// The app icon has a tag the template lacks; the tag is skipped.
    UnmatchedTag(IconTag),
    /// Compositing one tag failed; only that tag is omitted.
    Failed(IconError),
    /// The template has no entry for the biggest tag, so it cannot be synthesized.
    MissingTemplateVariant(IconTag),
    /// A compositing task panicked or was cancelled.
    TaskAborted(String),
}

impl fmt::Display for ReconcileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedTag(tag) => write!(f, "There is no base image for this type: {tag}"),
            Self::Failed(error) => write!(f, "{error}"),
            Self::MissingTemplateVariant(tag) => {
                write!(f, "Template has no {tag} image, cannot synthesize it")
            }
            Self::TaskAborted(reason) => write!(f, "Compositing task aborted: {reason}"),
        }
    }
}

/// Composed entries plus everything that was skipped along the way.
#[derive(Debug, Default)]
pub struct Reconciliation {
    /// Composed entries, ready for [`encode`](super::container::encode).
    pub icons: IconMap,
    /// Soft failures, in the order they were observed.
    pub warnings: Vec<ReconcileWarning>,
}

impl Reconciliation {
    fn warn(&mut self, warning: ReconcileWarning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }
}

/// Composites every app icon tag that has a template counterpart.
///
/// Matched tags run as independent blocking tasks; the output map is only
/// assembled after all of them have been joined. Afterwards, if
/// [`IconTag::BIGGEST`] is still missing, the largest app icon entry (by byte
/// size) is composited against the template's biggest variant.
///
/// Never fails as a whole: unmatched tags and per-tag errors become warnings.
pub async fn reconcile(app_icons: &IconMap, template_icons: &IconMap) -> Reconciliation {
    let mut result = Reconciliation::default();
    let mut tasks = JoinSet::new();

    for (tag, source) in app_icons {
        let Some(template) = template_icons.get(tag) else {
            result.warn(ReconcileWarning::UnmatchedTag(*tag));
            continue;
        };

        let tag = *tag;
        let source = source.clone();
        let template = template.clone();
        tasks.spawn_blocking(move || (tag, composite_encoded(tag, &source, &template)));
    }

    let mut composed = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => composed.push(outcome),
            Err(e) => result.warn(ReconcileWarning::TaskAborted(e.to_string())),
        }
    }

    // Join order is completion order; merge by tag for stable warnings.
    composed.sort_by_key(|(tag, _)| *tag);
    for (tag, outcome) in composed {
        match outcome {
            Ok(bytes) => {
                log::debug!("Composed {tag} ({} bytes)", bytes.len());
                result.icons.insert(tag, bytes);
            }
            Err(e) => result.warn(ReconcileWarning::Failed(e)),
        }
    }

    if !result.icons.contains_key(&IconTag::BIGGEST) {
        synthesize_biggest(app_icons, template_icons, &mut result).await;
    }

    result
}

/// Builds the biggest variant from the largest app icon entry.
///
/// Entries are tried by descending byte size until one composites, so an
/// undecodable legacy record does not block a smaller PNG from standing in.
async fn synthesize_biggest(
    app_icons: &IconMap,
    template_icons: &IconMap,
    result: &mut Reconciliation,
) {
    if app_icons.is_empty() {
        return;
    }
    let Some(template) = template_icons.get(&IconTag::BIGGEST) else {
        result.warn(ReconcileWarning::MissingTemplateVariant(IconTag::BIGGEST));
        return;
    };

    // Ties resolve to the highest tag, so the order is deterministic.
    let mut candidates: Vec<(IconTag, Vec<u8>)> = app_icons
        .iter()
        .map(|(tag, data)| (*tag, data.clone()))
        .collect();
    candidates.sort_by(|(a_tag, a), (b_tag, b)| b.len().cmp(&a.len()).then(b_tag.cmp(a_tag)));

    let template = template.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let mut last_error = None;
        for (source_tag, source) in candidates {
            log::debug!(
                "Synthesizing {} from {source_tag} ({} bytes)",
                IconTag::BIGGEST,
                source.len()
            );
            match composite_encoded(IconTag::BIGGEST, &source, &template) {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    log::debug!("Cannot synthesize from {source_tag}: {e}");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error)
    })
    .await;

    match joined {
        Ok(Ok(bytes)) => {
            result.icons.insert(IconTag::BIGGEST, bytes);
        }
        Ok(Err(Some(e))) => result.warn(ReconcileWarning::Failed(e)),
        Ok(Err(None)) => {}
        Err(e) => result.warn(ReconcileWarning::TaskAborted(e.to_string())),
    }
}
