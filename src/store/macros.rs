/// Shorthand for [`ArtifactCache::get_or_compute`](crate::store::ArtifactCache::get_or_compute).
///
/// Expands to a lookup of `$key` in `$cache`. On a miss (or when `$force` is
/// true) the async `$block` is awaited to compute the value, which is then
/// persisted under `$key`. Evaluates to `Result<Arc<T>, E>` where `E` is the
/// error type of `$block`.
///
/// # Example
/// ```rust,ignore
/// let texts = cached!(cache, ArtifactKey::AggregatedText, false, async {
///     Ok::<_, AppError>(aggregate(&reviews))
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $force:expr, $block:expr) => {{
        $cache.get_or_compute(&$key, $force, || $block).await
    }};
}
