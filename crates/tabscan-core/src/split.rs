use std::num::NonZeroUsize;
use std::path::Path;

use crate::document::DocumentHandle;
use crate::error::TabscanError;
use crate::model::DocumentPartition;

/// How a document is divided for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    pub partitions: Vec<DocumentPartition>,
    /// False when the document fits under the threshold and is processed
    /// in place rather than copied into sub-documents.
    pub split: bool,
}

/// Tile `[0, page_count - 1]` into contiguous ranges of at most `threshold`
/// pages. The last range takes whatever remains.
pub fn plan_partitions(page_count: usize, threshold: NonZeroUsize) -> SplitPlan {
    let threshold = threshold.get();

    if page_count == 0 {
        return SplitPlan {
            partitions: Vec::new(),
            split: false,
        };
    }

    if page_count <= threshold {
        return SplitPlan {
            partitions: vec![DocumentPartition::new(0, page_count - 1)],
            split: false,
        };
    }

    let count = page_count.div_ceil(threshold);
    let partitions = (0..count)
        .map(|i| {
            let start = i * threshold;
            let end = if i + 1 == count {
                page_count - 1
            } else {
                start + threshold - 1
            };
            DocumentPartition::new(start, end)
        })
        .collect();

    SplitPlan {
        partitions,
        split: true,
    }
}

/// Write `partition` of `document` as an independent PDF at `out`.
pub fn materialize_partition(
    document: &dyn DocumentHandle,
    partition: DocumentPartition,
    out: &Path,
) -> Result<(), TabscanError> {
    tracing::info!(
        partition = %partition,
        out = %out.display(),
        "writing sub-document"
    );
    document.extract_range(out, partition.start, partition.end)
}
