use cbz_core::RunStatistics;

/// Human-readable end-of-run report.
pub fn render(stats: &RunStatistics) -> String {
    format!(
        "Sources: {total} total, {ok} archived, {skipped} skipped, {failed} failed\n\
         Images: {expected} expected, {downloaded} downloaded, {failed_images} failed, \
         {failed_conversions} not convertible",
        total = stats.total_sources,
        ok = stats.successful_archives,
        skipped = stats.skipped_sources,
        failed = stats.failed_sources,
        expected = stats.expected_images,
        downloaded = stats.downloaded_images,
        failed_images = stats.failed_images,
        failed_conversions = stats.failed_conversions,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_every_counter() {
        let stats = RunStatistics {
            total_sources: 2,
            successful_archives: 2,
            skipped_sources: 0,
            failed_sources: 0,
            expected_images: 5,
            downloaded_images: 4,
            failed_images: 1,
            failed_conversions: 0,
        };
        assert_eq!(
            render(&stats),
            "Sources: 2 total, 2 archived, 0 skipped, 0 failed\n\
             Images: 5 expected, 4 downloaded, 1 failed, 0 not convertible"
        );
    }
}
