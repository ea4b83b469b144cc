mod transport;

use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use lazyload_runtime_std::StdRuntime;
use lazyload_ui::prelude::*;
use lazyload_ui::{EdgeInsets, Rect};

use transport::SimulatedNetwork;

const PHOTO_COUNT: u32 = 24;
const TILE_HEIGHT: f32 = 200.0;
const TILE_GAP: f32 = 20.0;
const VIEWPORT: Rect = Rect::new(0.0, 0.0, 360.0, 640.0);
const SCROLL_STEP: f32 = 40.0;
const FRAME: Duration = Duration::from_millis(16);
const TIMEOUT: Duration = Duration::from_secs(15);

fn main() {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!("=== Lazyload Gallery Demo ===");
    println!(
        "Scrolling {PHOTO_COUNT} photos through a {}x{} viewport",
        VIEWPORT.width, VIEWPORT.height
    );
    println!();

    let runtime = StdRuntime::new();
    let document = Document::new();
    document.set_viewport(VIEWPORT);

    let config =
        LazyImageConfig::default().with_root_margin(EdgeInsets::vertical(TILE_HEIGHT / 2.0));
    let network = SimulatedNetwork {
        base_latency: Duration::from_millis(60),
        fail_every: 7,
    };
    let lazy_images = LazyImages::new(
        config,
        runtime.runtime_handle(),
        document.clone(),
        Rc::new(network),
    );
    lazy_images.install();

    let photos: Vec<ElementId> = (0..PHOTO_COUNT)
        .map(|index| attach_photo(&document, index))
        .collect();

    let content_height = PHOTO_COUNT as f32 * (TILE_HEIGHT + TILE_GAP);
    let max_scroll = (content_height - VIEWPORT.height).max(0.0);
    let started = Instant::now();
    let mut scroll = 0.0_f32;

    loop {
        if runtime.take_frame_request() {
            runtime.pump_frame();
        }

        if scroll < max_scroll {
            scroll = (scroll + SCROLL_STEP).min(max_scroll);
            document.scroll_to(scroll);
            lazy_images.observe();
        } else if photos.iter().all(|id| lazy_images.state(*id).is_terminal())
            && !runtime.runtime_handle().has_frame_callbacks()
        {
            break;
        }

        if started.elapsed() > TIMEOUT {
            log::warn!("gallery did not settle within {TIMEOUT:?}");
            break;
        }
        thread::sleep(FRAME);
    }

    print_summary(&document, &lazy_images, &photos);
    LazyImages::uninstall();
}

fn attach_photo(document: &Document, index: u32) -> ElementId {
    let id = document.create_image("/placeholder.svg");
    document.set_bounds(
        id,
        Rect::new(0.0, index as f32 * (TILE_HEIGHT + TILE_GAP), VIEWPORT.width, TILE_HEIGHT),
    );
    if let Some(service) = current_lazy_images() {
        service.on_create(id);
        service.on_attach(id, &format!("/photos/{index}.jpg"));
    }
    id
}

fn print_summary(document: &Document, lazy_images: &LazyImages, photos: &[ElementId]) {
    println!();
    let (mut loaded, mut failed, mut other) = (0, 0, 0);
    for id in photos {
        let state = lazy_images.state(*id);
        match state {
            LoadState::Success => loaded += 1,
            LoadState::Failed => failed += 1,
            _ => other += 1,
        }
        println!(
            "{:>4}  {state:<8} {}",
            id.to_string(),
            document.src(*id).unwrap_or_default()
        );
    }
    println!();
    println!("loaded {loaded}, failed {failed}, unfinished {other}");
}
