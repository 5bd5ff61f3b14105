pub mod cluster;
pub mod job;
pub mod metrics;
pub mod pipeline;
pub mod spark;

pub use cluster::{Cluster, ClusterId, ClusterList, CLUSTER_RUNNING};
pub use job::{Job, JobId, JobRun, JobSchedule, JobSettings, JobTask, JobsPage, RunId, RunState, RunsPage};
pub use metrics::{DataPoint, JobWatermark, ScrapeReport};
pub use pipeline::{
    PipelineDetail, PipelineId, PipelineList, PipelineStatus, PipelineSummary, PIPELINE_RUNNING,
};
