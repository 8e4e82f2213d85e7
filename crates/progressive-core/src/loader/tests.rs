use super::test_host::{Notice, RecordingHost};
use super::*;
use crate::aspect::DEFAULT_ASPECT_RATIO;
use crate::orientation::fixtures::jpeg_with_orientation;
use crate::Size;

fn loader_with(options: LoaderOptions) -> ImageLoader<RecordingHost> {
    ImageLoader::new(RecordingHost::default(), options)
}

fn loader() -> ImageLoader<RecordingHost> {
    loader_with(LoaderOptions::default())
}

fn with_fallback(src: &str, fallback: &str) -> ImageProps {
    let mut props = ImageProps::new(src);
    props.fallback = Some(fallback.to_string());
    props
}

fn deliver_jpeg(loader: &mut ImageLoader<RecordingHost>, code: u16) {
    let ticket = loader.ticket();
    loader.bytes_fetched(ticket, &jpeg_with_orientation(code), Some("image/jpeg"));
}

fn fire(loader: &mut ImageLoader<RecordingHost>, timer: Timer) {
    let (ticket, _) = *loader
        .host()
        .active_timers
        .get(&timer)
        .unwrap_or_else(|| panic!("{:?} is not active", timer));
    loader.timer_fired(ticket, timer);
}

// ============================================================================
// Main pipeline
// ============================================================================

#[test]
fn test_full_pipeline_redraws_and_fades_in() {
    let mut options = LoaderOptions::default();
    options.delay = 150;
    let mut loader = loader_with(options);
    loader.host_mut().set_main_size(Some(Size::new(400, 300)));

    let mut props = ImageProps::new("photo.jpg");
    props.placeholder = Some("thumb.jpg".to_string());
    loader.load(props);

    let ticket = loader.ticket();
    assert_eq!(loader.state().phase(), Phase::FetchingBytes);
    assert_eq!(loader.host().fetches, vec![(ticket, "photo.jpg".to_string())]);
    assert_eq!(
        loader.host().loads,
        vec![(ImageSlot::Placeholder, "thumb.jpg".to_string())]
    );

    loader.placeholder_loaded(ticket);
    assert!(loader.view().should_show_placeholder);

    deliver_jpeg(&mut loader, 6);
    assert_eq!(loader.state().phase(), Phase::AwaitingDimensions);
    assert_eq!(loader.orientation(), Orientation::Rotate90CW);
    let main = loader.host().main_loads();
    assert_eq!(main.len(), 1);
    assert!(main[0].starts_with("data:image/jpeg;base64,"));
    assert_eq!(loader.host().active_timers[&Timer::PollTick], (ticket, 10));
    assert_eq!(loader.host().active_timers[&Timer::PollDeadline], (ticket, 2500));

    loader.image_loaded(ticket);
    assert_eq!(loader.state().phase(), Phase::FadingIn);
    assert_eq!(
        loader.host().draws,
        vec![DrawPlan::new(Orientation::Rotate90CW, Size::new(400, 300))]
    );
    assert_eq!(loader.host().draws[0].canvas, Size::new(300, 400));
    assert_eq!(loader.host().renders, vec![ticket]);
    assert_eq!(loader.host().loads_reported().len(), 1);
    assert!(!loader.state().is_rendered());
    assert!(loader.view().should_show_placeholder, "placeholder stays until the fade");

    loader.render_flushed(ticket);
    assert_eq!(loader.host().active_timers[&Timer::FadeDelay], (ticket, 150));

    fire(&mut loader, Timer::FadeDelay);
    assert_eq!(loader.state().phase(), Phase::Rendered);
    let view = loader.view();
    assert!(view.should_show_image);
    assert!(!view.should_show_placeholder);
    assert!(!view.is_cached);
}

#[test]
fn test_cache_fast_path_skips_drawing() {
    let mut loader = loader();
    loader.host_mut().cache_everything = true;
    let mut props = ImageProps::new("photo.jpg");
    props.placeholder = Some("thumb.jpg".to_string());
    loader.load(props);
    let ticket = loader.ticket();

    deliver_jpeg(&mut loader, 6);

    assert_eq!(loader.state().phase(), Phase::Rendered);
    assert!(loader.state().is_rendered());
    assert!(loader.view().is_cached);
    assert!(loader.state().placeholder_url().is_none());
    assert!(loader.host().draws.is_empty());
    assert!(loader.host().renders.is_empty());
    assert!(!loader.host().timer_active(Timer::FadeDelay));
    assert_eq!(loader.host().loads_reported().len(), 1);

    // The handle still loads so dimensions can be discovered
    assert!(loader.host().timer_active(Timer::PollTick));
    assert_eq!(loader.host().main_loads().len(), 1);

    // Its load signal must not redraw or re-report
    loader.image_loaded(ticket);
    assert!(loader.host().draws.is_empty());
    assert_eq!(loader.host().loads_reported().len(), 1);

    // A placeholder arriving late is reported but not shown
    loader.placeholder_loaded(ticket);
    assert!(!loader.view().should_show_placeholder);
    assert!(loader
        .host()
        .notices
        .contains(&Notice::PlaceholderLoad("thumb.jpg".to_string())));
}

#[test]
fn test_cache_disabled_takes_slow_path() {
    let mut options = LoaderOptions::default();
    options.cache = false;
    let mut loader = loader_with(options);
    loader.host_mut().cache_everything = true;

    loader.load(ImageProps::new("photo.jpg"));
    deliver_jpeg(&mut loader, 1);

    assert_eq!(loader.state().phase(), Phase::AwaitingDimensions);
    assert!(!loader.state().is_cached());
}

#[test]
fn test_explicit_aspect_ratio_skips_poll() {
    let mut loader = loader();
    let mut props = ImageProps::new("photo.jpg");
    props.aspect_ratio = Some(1.0);
    loader.load(props);

    deliver_jpeg(&mut loader, 1);

    assert_eq!(loader.state().phase(), Phase::AwaitingDimensions);
    assert!(loader.host().started_timers.is_empty());
    assert_eq!(loader.view().padding_bottom.as_deref(), Some("100%"));
}

#[test]
fn test_non_jpeg_draws_without_transform() {
    let mut loader = loader();
    loader.host_mut().set_main_size(Some(Size::new(10, 20)));
    loader.load(ImageProps::new("icon.png"));
    let ticket = loader.ticket();

    let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    loader.bytes_fetched(ticket, &png, None);
    loader.image_loaded(ticket);

    assert_eq!(loader.orientation(), Orientation::Normal);
    assert!(loader.host().main_loads()[0].starts_with("data:image/png;base64,"));
    assert_eq!(loader.host().draws[0].transform, None);
}

#[test]
fn test_draw_failure_is_swallowed() {
    let mut loader = loader();
    loader.host_mut().fail_draws = true;
    loader.host_mut().set_main_size(Some(Size::new(400, 300)));
    loader.load(ImageProps::new("photo.jpg"));
    let ticket = loader.ticket();

    deliver_jpeg(&mut loader, 3);
    loader.image_loaded(ticket);
    loader.render_flushed(ticket);
    fire(&mut loader, Timer::FadeDelay);

    assert!(loader.host().draws.is_empty());
    assert_eq!(loader.state().phase(), Phase::Rendered);
    assert_eq!(loader.host().loads_reported().len(), 1);
}

#[test]
fn test_repeated_load_signal_is_ignored() {
    let mut loader = loader();
    loader.host_mut().set_main_size(Some(Size::new(400, 300)));
    loader.load(ImageProps::new("photo.jpg"));
    let ticket = loader.ticket();

    deliver_jpeg(&mut loader, 1);
    loader.image_loaded(ticket);
    loader.render_flushed(ticket);
    fire(&mut loader, Timer::FadeDelay);
    loader.image_loaded(ticket);

    assert_eq!(loader.host().draws.len(), 1);
    assert_eq!(loader.host().loads_reported().len(), 1);
    assert_eq!(loader.state().phase(), Phase::Rendered);
}

#[test]
fn test_out_of_order_completions_are_ignored() {
    let mut loader = loader();
    loader.load(ImageProps::new("photo.jpg"));
    let ticket = loader.ticket();

    // No bytes yet: nothing to decode, flush or fade
    loader.image_loaded(ticket);
    loader.render_flushed(ticket);
    assert_eq!(loader.state().phase(), Phase::FetchingBytes);
    assert!(loader.host().renders.is_empty());
    assert!(!loader.host().timer_active(Timer::FadeDelay));
}

// ============================================================================
// Aspect ratio poll
// ============================================================================

#[test]
fn test_poll_resolves_dimensions() {
    let mut loader = loader();
    loader.load(ImageProps::new("photo.jpg"));
    deliver_jpeg(&mut loader, 1);

    fire(&mut loader, Timer::PollTick);
    assert!(loader.state().poll().is_polling());
    assert_eq!(loader.state().resolved_aspect_ratio(), DEFAULT_ASPECT_RATIO);

    loader.host_mut().set_main_size(Some(Size::new(800, 600)));
    fire(&mut loader, Timer::PollTick);

    assert_eq!(loader.state().resolved_aspect_ratio(), 0.75);
    assert_eq!(loader.state().resolved_width(), 800);
    assert!(!loader.host().timer_active(Timer::PollTick));
    assert!(!loader.host().timer_active(Timer::PollDeadline));
    assert_eq!(loader.view().max_width, "800px");
    assert_eq!(loader.view().padding_bottom.as_deref(), Some("75%"));
}

#[test]
fn test_poll_timeout_then_single_retry() {
    let mut options = LoaderOptions::default();
    options.timeout = 50;
    let mut loader = loader_with(options);
    loader.load(ImageProps::new("photo.jpg"));
    let ticket = loader.ticket();
    deliver_jpeg(&mut loader, 1);
    assert_eq!(loader.host().active_timers[&Timer::PollDeadline], (ticket, 50));

    fire(&mut loader, Timer::PollDeadline);
    assert_eq!(loader.state().poll().status(), PollStatus::Killed);
    assert!(!loader.host().timer_active(Timer::PollTick));
    assert_eq!(loader.state().resolved_aspect_ratio(), DEFAULT_ASPECT_RATIO);

    loader.image_loaded(ticket);
    assert!(loader.host().timer_active(Timer::PollTick));

    fire(&mut loader, Timer::PollDeadline);
    let poll_starts = loader
        .host()
        .started_timers
        .iter()
        .filter(|(timer, _)| *timer == Timer::PollTick)
        .count();
    assert_eq!(poll_starts, 2);
    assert_eq!(loader.state().poll().status(), PollStatus::Killed);
}

// ============================================================================
// Failure and fallback
// ============================================================================

#[test]
fn test_fallback_restarts_once_then_errors() {
    let mut loader = loader();
    loader.load(with_fallback("photo.jpg", "fallback.jpg"));
    let first = loader.ticket();

    loader.fetch_failed(first, "HTTP 500");
    assert_eq!(loader.host().errors(), 1);
    assert_eq!(loader.state().phase(), Phase::FetchingBytes);
    assert!(loader.state().is_errored());
    let (second, url) = loader.host().fetches[1].clone();
    assert_eq!(url, "fallback.jpg");
    assert_ne!(second, first);
    assert_eq!(loader.request().map(|r| r.source_url.as_str()), Some("fallback.jpg"));

    loader.fetch_failed(second, "HTTP 404");
    assert_eq!(loader.host().errors(), 2);
    assert_eq!(loader.state().phase(), Phase::Errored);
    assert_eq!(loader.host().fetches.len(), 2);

    // Nothing further is attempted
    loader.fetch_failed(second, "HTTP 404");
    assert_eq!(loader.host().errors(), 2);
    assert_eq!(loader.host().fetches.len(), 2);
}

#[test]
fn test_fallback_url_is_used_as_image_source() {
    let mut loader = loader();
    loader.host_mut().set_main_size(Some(Size::new(640, 480)));
    loader.load(with_fallback("photo.jpg", "fallback.jpg"));
    loader.fetch_failed(loader.ticket(), "offline");

    deliver_jpeg(&mut loader, 3);
    assert_eq!(loader.host().main_loads(), vec!["fallback.jpg"]);
    assert_eq!(loader.orientation(), Orientation::Rotate180);

    loader.image_loaded(loader.ticket());
    assert_eq!(loader.host().loads_reported(), vec!["fallback.jpg"]);
    assert!(!loader.state().is_errored());
    assert_eq!(loader.state().phase(), Phase::FadingIn);
}

#[test]
fn test_decode_failure_triggers_fallback() {
    let mut loader = loader();
    loader.load(with_fallback("photo.jpg", "fallback.jpg"));
    let first = loader.ticket();
    deliver_jpeg(&mut loader, 1);
    assert!(loader.host().timer_active(Timer::PollTick));

    loader.image_failed(first, "image element error");

    match &loader.host().notices[0] {
        Notice::Error(LoadError::Decode { url, .. }) => {
            assert!(url.starts_with("data:image/jpeg;base64,"))
        }
        other => panic!("expected decode error, got {:?}", other),
    }
    assert!(!loader.host().timer_active(Timer::PollTick));
    assert_eq!(loader.host().fetches.last().map(|(_, u)| u.as_str()), Some("fallback.jpg"));

    // Stale completions from the first attempt are dropped
    loader.image_loaded(first);
    assert!(loader.state().image_url().is_none());
}

#[test]
fn test_no_fallback_halts_in_errored() {
    let mut loader = loader();
    loader.load(ImageProps::new("photo.jpg"));

    loader.fetch_failed(loader.ticket(), "offline");

    assert_eq!(loader.state().phase(), Phase::Errored);
    assert_eq!(loader.host().errors(), 1);
    assert_eq!(loader.host().fetches.len(), 1);
    assert_eq!(
        loader.host().notices[0],
        Notice::Error(LoadError::fetch("photo.jpg", "offline"))
    );
}

#[test]
fn test_failure_after_render_is_ignored() {
    let mut loader = loader();
    loader.host_mut().cache_everything = true;
    loader.load(with_fallback("photo.jpg", "fallback.jpg"));
    deliver_jpeg(&mut loader, 1);

    loader.image_failed(loader.ticket(), "late error");

    assert_eq!(loader.state().phase(), Phase::Rendered);
    assert_eq!(loader.host().errors(), 0);
    assert_eq!(loader.host().fetches.len(), 1);
}

// ============================================================================
// Supersession
// ============================================================================

#[test]
fn test_superseded_load_does_not_mutate_state() {
    let mut loader = loader();
    let mut props = ImageProps::new("a.jpg");
    props.placeholder = Some("thumb.jpg".to_string());
    loader.load(props);
    deliver_jpeg(&mut loader, 6);
    let stale = loader.ticket();
    assert_eq!(loader.state().phase(), Phase::AwaitingDimensions);

    loader.source_changed("b.jpg");
    assert_eq!(loader.state().phase(), Phase::FetchingBytes);
    assert_eq!(loader.host().fetches.last().map(|(_, u)| u.as_str()), Some("b.jpg"));
    assert!(!loader.host().timer_active(Timer::PollTick));
    assert!(!loader.host().timer_active(Timer::PollDeadline));

    loader.host_mut().set_main_size(Some(Size::new(100, 100)));
    loader.image_loaded(stale);
    loader.timer_fired(stale, Timer::PollTick);
    loader.bytes_fetched(stale, &jpeg_with_orientation(3), None);
    loader.fetch_failed(stale, "late");
    loader.placeholder_loaded(stale);

    assert_eq!(loader.state().phase(), Phase::FetchingBytes);
    assert!(loader.state().image_url().is_none());
    assert!(loader.state().placeholder_url().is_none());
    assert_eq!(loader.state().resolved_width(), 0);
    assert_eq!(loader.orientation(), Orientation::Normal);
    assert!(loader.host().draws.is_empty());
    assert_eq!(loader.host().errors(), 0);

    // The new load keeps the props it was given
    assert_eq!(
        loader.request().and_then(|r| r.placeholder_url.as_deref()),
        Some("thumb.jpg")
    );
}

#[test]
fn test_load_start_reported_per_source_not_per_fallback() {
    let mut loader = loader();
    loader.load(with_fallback("a.jpg", "fallback.jpg"));
    loader.fetch_failed(loader.ticket(), "offline");
    assert_eq!(loader.host().starts, vec!["a.jpg"]);

    loader.source_changed("b.jpg");
    assert_eq!(loader.host().starts, vec!["a.jpg", "b.jpg"]);
}

#[test]
fn test_explicit_ratio_fast_path_then_source_change() {
    let mut loader = loader();
    loader.host_mut().cache_everything = true;
    let mut props = ImageProps::new("a.jpg");
    props.aspect_ratio = Some(0.5);
    loader.load(props);
    let stale = loader.ticket();
    deliver_jpeg(&mut loader, 6);

    assert_eq!(loader.state().phase(), Phase::Rendered);
    assert!(loader.host().main_loads().is_empty());
    assert!(loader.host().started_timers.is_empty());

    loader.source_changed("b.jpg");
    loader.image_loaded(stale);

    assert_eq!(loader.state().phase(), Phase::FetchingBytes);
    assert!(!loader.state().is_rendered());
    assert_eq!(loader.request().and_then(|r| r.explicit_aspect_ratio), Some(0.5));
    assert_eq!(loader.view().padding_bottom.as_deref(), Some("50%"));
}

#[test]
fn test_teardown_ignores_completions() {
    let mut loader = loader();
    loader.load(ImageProps::new("photo.jpg"));
    let ticket = loader.ticket();

    loader.teardown();
    loader.bytes_fetched(ticket, &jpeg_with_orientation(6), None);

    assert_eq!(loader.state().phase(), Phase::FetchingBytes);
    assert!(loader.host().main_loads().is_empty());
}

// ============================================================================
// Placeholder
// ============================================================================

#[test]
fn test_placeholder_error_is_reported_only() {
    let mut loader = loader();
    let mut props = ImageProps::new("photo.jpg");
    props.placeholder = Some("thumb.jpg".to_string());
    loader.load(props);
    let ticket = loader.ticket();

    loader.placeholder_failed(ticket, "404");

    assert_eq!(
        loader.host().notices,
        vec![Notice::PlaceholderError(LoadError::decode("thumb.jpg", "404"))]
    );
    assert!(!loader.view().should_show_placeholder);
    assert_eq!(loader.state().phase(), Phase::FetchingBytes);
}

#[test]
fn test_placeholder_survives_fallback_restart() {
    let mut loader = loader();
    let mut props = with_fallback("photo.jpg", "fallback.jpg");
    props.placeholder = Some("thumb.jpg".to_string());
    loader.load(props);
    let first = loader.ticket();

    loader.fetch_failed(first, "offline");
    loader.placeholder_loaded(first);

    assert!(loader.view().should_show_placeholder);
    let placeholder_requests = loader
        .host()
        .loads
        .iter()
        .filter(|(slot, _)| *slot == ImageSlot::Placeholder)
        .count();
    assert_eq!(placeholder_requests, 1);
}

#[test]
fn test_placeholder_from_options() {
    let mut options = LoaderOptions::default();
    options.placeholder = Some("default-thumb.jpg".to_string());
    let mut loader = loader_with(options);

    loader.load(ImageProps::new("photo.jpg"));

    assert_eq!(loader.placeholder().url(), Some("default-thumb.jpg"));
    assert_eq!(loader.placeholder().status(), PlaceholderStatus::Loading);
}
