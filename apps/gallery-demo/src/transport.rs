use std::thread;
use std::time::Duration;

use lazyload_ui::{FetchError, FetchRequest, FetchResponder, ImageTransport};

/// Pretends to download each image on its own thread.
///
/// Latency is derived from the source so runs are repeatable; every source
/// whose number is a multiple of `fail_every` answers 404.
pub struct SimulatedNetwork {
    pub base_latency: Duration,
    pub fail_every: u32,
}

impl SimulatedNetwork {
    fn photo_number(source: &str) -> Option<u32> {
        source
            .rsplit('/')
            .next()?
            .strip_suffix(".jpg")?
            .parse()
            .ok()
    }

    fn latency(&self, source: &str) -> Duration {
        let jitter = source.bytes().fold(0u64, |acc, byte| acc.wrapping_mul(31) ^ byte as u64) % 80;
        self.base_latency + Duration::from_millis(jitter)
    }
}

impl ImageTransport for SimulatedNetwork {
    fn fetch(&self, request: FetchRequest, responder: FetchResponder) {
        let latency = self.latency(request.source());
        let broken = Self::photo_number(request.source())
            .is_some_and(|number| self.fail_every != 0 && number % self.fail_every == 0);
        log::info!("GET {} ({} ms)", request.source(), latency.as_millis());

        thread::spawn(move || {
            thread::sleep(latency);
            if broken {
                responder.reject(FetchError::Status(404));
            } else {
                responder.resolve();
            }
        });
    }
}
