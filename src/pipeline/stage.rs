//! Per-(theme, sentiment) progress through the pipeline.

use std::fmt;

use crate::nlp::{FallbackReason, SentimentInsight};

/// Stages a batch moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    NoComments,
    Sampled,
    Summarized,
    Embedded,
    Clustered,
    Synthesized,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoComments => "no_comments",
            Self::Sampled => "sampled",
            Self::Summarized => "summarized",
            Self::Embedded => "embedded",
            Self::Clustered => "clustered",
            Self::Synthesized => "synthesized",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// What happened to one (theme, sentiment) batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub stages: Vec<Stage>,
    pub comments: usize,
    pub sampled: usize,
    pub claims: usize,
    pub cluster_sizes: Vec<usize>,
    pub fallback: Option<FallbackReason>,
    pub embedding_error: Option<String>,
    pub insight: SentimentInsight,
}

impl BatchReport {
    pub(crate) fn enter(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn reached(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_sizes.len()
    }
}
