/// Builds the canonical web URL for a build's results page.
///
/// Used as a fallback when the platform response carries no `web` link.
///
/// # Arguments
///
/// * `organization_url` - Organization base URL (e.g., <https://dev.azure.com/myorg>)
/// * `project` - Project name
/// * `build_id` - Numeric build identifier
///
/// # Returns
///
/// Clickable URL to the build (e.g.,
/// <https://dev.azure.com/myorg/myproject/_build/results?buildId=1234>)
pub fn build_web_url(organization_url: &str, project: &str, build_id: u32) -> String {
    let base = organization_url.trim_end_matches('/');
    format!("{base}/{project}/_build/results?buildId={build_id}")
}
