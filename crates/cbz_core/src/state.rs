/// Progress of a single source page through the pipeline.
///
/// `Pending → Extracting → Downloading → Converting → Packaging → Done`,
/// with `Failed` reachable from every non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Pending,
    Extracting,
    Downloading,
    Converting,
    Packaging,
    Done,
    Failed,
}
