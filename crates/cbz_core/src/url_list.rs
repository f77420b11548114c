/// Splits a newline-delimited URL list, trimming lines and dropping blank ones.
pub fn parse_url_list(raw: &str) -> Vec<String> {
    raw.trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
