//! `bl`: broken links among the vocabulary's HTTP resources.

use crate::engine::{Issue, IssueContext};
use crate::error::ComputeError;
use crate::links::LinkReport;
use crate::models::{Category, IssueMeta};
use crate::result::Outcome;
use crate::sampling::{SampleSpec, Sampler};
use async_trait::async_trait;
use std::sync::Mutex;

pub struct BrokenLinks {
    subset_percent: Option<f32>,
    sampler: Mutex<Sampler>,
}

const BROKEN_LINKS: IssueMeta = IssueMeta {
    code: "bl",
    name: "Broken Links",
    description: "Checks dereferencability of HTTP URIs",
    category: Category::Analytical,
    weblink: Some(quality_issue!("broken-links")),
};

impl BrokenLinks {
    pub fn new(subset_percent: Option<f32>, sampler: Sampler) -> Self {
        Self {
            subset_percent,
            sampler: Mutex::new(sampler),
        }
    }
}

#[async_trait]
impl Issue for BrokenLinks {
    fn meta(&self) -> &IssueMeta {
        &BROKEN_LINKS
    }

    fn dependencies(&self) -> &[&'static str] {
        &["huri"]
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let uris = ctx.collection("huri")?;
        let spec = SampleSpec::new(uris.len(), self.subset_percent)?;

        if uris.is_empty() {
            return Ok(Outcome::Links(LinkReport {
                outcomes: Vec::new(),
                reachable: 0,
                broken: 0,
                total_checked: 0,
                estimate: spec.extrapolate(0),
            }));
        }

        let sample = {
            let mut sampler = self.sampler.lock().unwrap_or_else(|e| e.into_inner());
            sampler.select(&spec, uris)
        };

        let report = ctx.links()?.verify(&sample, &spec).await;
        Ok(Outcome::Links(report))
    }
}
