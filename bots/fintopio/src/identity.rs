//! Per-account request fingerprinting.
//!
//! Each account pass gets a device descriptor, user agent and fingerprint
//! that were not handed out before in this run. The exclusion sets are
//! bounded by the size of their pools; once a pool is used up the sets are
//! cleared and values may repeat from then on.

use core_logic::IdentityError;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT,
};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; Generic) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Mobile Safari/537.36";

const MAX_ATTEMPTS: usize = 10;
const FINGERPRINT_CAPACITY: usize = 4096;

const PLATFORMS: &[&str] = &[
    "Android 10",
    "Android 11",
    "Android 12",
    "Android 13",
    "Android 12L",
    "Android 11.0.1",
    "Android 10.0.1",
    "Android 13.0.1",
];

const DEVICE_MODELS: &[&str] = &[
    // Samsung
    "SM-G998B",
    "SM-G991B",
    "SM-A526B",
    "SM-G973F",
    // Xiaomi
    "M2102J20SG",
    "M2103K19G",
    "M2012K11AG",
    // OnePlus
    "IN2023",
    "KB2001",
    "LE2101",
    // Vivo
    "V2045",
    "V2026",
    "V2023",
    // ASUS
    "ASUS_I001DA",
    "ASUS_I003DD",
    // Realme
    "RMX3081",
    "RMX3151",
    "RMX3381",
    // Huawei
    "NOH-NX9",
    "ELS-NX9",
    "YAL-L41",
];

const SCREEN_RESOLUTIONS: &[&str] = &[
    "1080x2400",
    "1440x3200",
    "1080x2340",
    "1440x2960",
    "1080x2460",
    "1440x3040",
    "1080x2280",
    "1440x2880",
    "1080x2520",
    "1440x3120",
    "1080x2300",
    "1440x2800",
];

const GPU_VENDORS: &[&str] = &[
    "Qualcomm",
    "ARM",
    "Mali-G78",
    "PowerVR",
    "Adreno 660",
    "Mali-G77",
    "Adreno 650",
    "Mali-G76",
    "Adreno 640",
    "Mali-G72",
];

static BASE_HEADERS: Lazy<HeaderMap> = Lazy::new(|| {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(
        REFERER,
        HeaderValue::from_static("https://fintopio-tg.fintopio.com/"),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua"),
        HeaderValue::from_static(
            "\"Not/A)Brand\";v=\"99\", \"Google Chrome\";v=\"115\", \"Chromium\";v=\"115\"",
        ),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-mobile"),
        HeaderValue::from_static("?1"),
    );
    headers
});

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceDescriptor {
    pub model: &'static str,
    pub platform: &'static str,
    pub screen_resolution: &'static str,
    pub gpu_vendor: &'static str,
}

impl DeviceDescriptor {
    pub fn key(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.model, self.platform, self.screen_resolution, self.gpu_vendor
        )
    }
}

#[derive(Debug, Clone)]
pub struct Identity {
    pub headers: HeaderMap,
    pub user_agent: String,
    pub fingerprint: String,
    pub device: DeviceDescriptor,
}

/// Values already handed out. Clears itself once `capacity` is reached.
#[derive(Debug, Clone)]
pub(crate) struct DedupSet {
    seen: HashSet<String>,
    capacity: usize,
}

impl DedupSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    pub fn insert(&mut self, value: String) {
        if self.seen.len() >= self.capacity {
            self.seen.clear();
        }
        self.seen.insert(value);
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }
}

pub struct IdentityProvider {
    user_agents: Vec<String>,
    used_models: DedupSet,
    used_devices: DedupSet,
    used_user_agents: DedupSet,
    used_fingerprints: DedupSet,
    rng: StdRng,
}

/// Strips control characters and collapses whitespace.
pub fn sanitize_user_agent(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| !c.is_control()).collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl IdentityProvider {
    /// Loads the user-agent corpus. A missing or empty corpus is fatal.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, IdentityError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| IdentityError::CorpusUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let user_agents: Vec<String> = content.lines().map(String::from).collect();
        Self::from_corpus(user_agents, &path.display().to_string())
    }

    pub fn new(user_agents: Vec<String>) -> Result<Self, IdentityError> {
        Self::from_corpus(user_agents, "<memory>")
    }

    fn from_corpus(user_agents: Vec<String>, origin: &str) -> Result<Self, IdentityError> {
        let user_agents: Vec<String> = user_agents
            .iter()
            .map(|ua| sanitize_user_agent(ua))
            .filter(|ua| !ua.is_empty())
            .collect();

        if user_agents.is_empty() {
            return Err(IdentityError::CorpusEmpty {
                path: origin.to_string(),
            });
        }

        Ok(Self {
            used_models: DedupSet::new(DEVICE_MODELS.len()),
            used_devices: DedupSet::new(
                DEVICE_MODELS.len() * PLATFORMS.len() * SCREEN_RESOLUTIONS.len() * GPU_VENDORS.len(),
            ),
            used_user_agents: DedupSet::new(user_agents.len()),
            used_fingerprints: DedupSet::new(FINGERPRINT_CAPACITY),
            user_agents,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn corpus_size(&self) -> usize {
        self.user_agents.len()
    }

    /// Produces a fresh identity, falling back to the default user agent if
    /// the drawn one cannot be used.
    pub fn generate(&mut self) -> Identity {
        match self.try_generate() {
            Ok(identity) => identity,
            Err(e) => {
                warn!("Error generating fake data: {}", e);
                self.fallback()
            }
        }
    }

    fn try_generate(&mut self) -> Result<Identity, IdentityError> {
        let device = self.next_device();
        let user_agent = self.next_user_agent();

        if user_agent.len() < 10 {
            return Err(IdentityError::InvalidUserAgent { user_agent });
        }
        let ua_header =
            HeaderValue::from_str(&user_agent).map_err(|_| IdentityError::InvalidHeader {
                name: USER_AGENT.to_string(),
            })?;

        let fingerprint = self.next_fingerprint(&device);
        Ok(Identity {
            headers: build_headers(&device, ua_header, &fingerprint),
            user_agent,
            fingerprint,
            device,
        })
    }

    fn fallback(&mut self) -> Identity {
        let device = self.next_device();
        let fingerprint = self.next_fingerprint(&device);
        Identity {
            headers: build_headers(
                &device,
                HeaderValue::from_static(DEFAULT_USER_AGENT),
                &fingerprint,
            ),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fingerprint,
            device,
        }
    }

    fn reset(&mut self) {
        debug!(
            "Identity pools exhausted, clearing {} models and {} devices",
            self.used_models.len(),
            self.used_devices.len()
        );
        self.used_models.clear();
        self.used_devices.clear();
        self.used_user_agents.clear();
        self.used_fingerprints.clear();
    }

    fn next_device(&mut self) -> DeviceDescriptor {
        let unused: Vec<&'static str> = DEVICE_MODELS
            .iter()
            .copied()
            .filter(|m| !self.used_models.contains(m))
            .collect();

        let candidates = if unused.is_empty() {
            self.reset();
            DEVICE_MODELS.to_vec()
        } else {
            unused
        };

        let model = *pick(&candidates, &mut self.rng);
        let mut attempts = 0;
        let device = loop {
            let rng = &mut self.rng;
            let candidate = DeviceDescriptor {
                model,
                platform: *pick(PLATFORMS, rng),
                screen_resolution: *pick(SCREEN_RESOLUTIONS, rng),
                gpu_vendor: *pick(GPU_VENDORS, rng),
            };
            attempts += 1;
            if !self.used_devices.contains(&candidate.key()) || attempts >= MAX_ATTEMPTS {
                break candidate;
            }
        };

        self.used_models.insert(device.model.to_string());
        self.used_devices.insert(device.key());
        device
    }

    fn next_user_agent(&mut self) -> String {
        let mut attempts = 0;
        let user_agent = loop {
            let candidate = pick(&self.user_agents, &mut self.rng).clone();
            attempts += 1;
            if !self.used_user_agents.contains(&candidate) {
                break candidate;
            }
            if attempts >= MAX_ATTEMPTS {
                self.used_user_agents.clear();
                break candidate;
            }
        };

        self.used_user_agents.insert(user_agent.clone());
        user_agent
    }

    fn next_fingerprint(&mut self, device: &DeviceDescriptor) -> String {
        let mut attempts = 0;
        let fingerprint = loop {
            let candidate = fingerprint_for(device, &mut self.rng);
            attempts += 1;
            if !self.used_fingerprints.contains(&candidate) {
                break candidate;
            }
            if attempts >= MAX_ATTEMPTS {
                self.used_fingerprints.clear();
                break candidate;
            }
        };

        self.used_fingerprints.insert(fingerprint.clone());
        fingerprint
    }

    #[cfg(test)]
    fn used_model_count(&self) -> usize {
        self.used_models.len()
    }

    #[cfg(test)]
    fn used_device_count(&self) -> usize {
        self.used_devices.len()
    }
}

fn pick<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> &'a T {
    // Pools are never empty: the static ones are non-empty and the corpus is checked on load
    items.choose(rng).unwrap_or(&items[0])
}

/// 128-bit hex digest of the descriptor plus a nanosecond clock and a random nonce.
pub fn fingerprint_for<R: Rng + ?Sized>(device: &DeviceDescriptor, rng: &mut R) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let nonce: u64 = rng.gen();

    let mut hasher = Sha256::new();
    hasher.update(device.key().as_bytes());
    hasher.update(nanos.to_le_bytes());
    hasher.update(nonce.to_le_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..16])
}

fn build_headers(
    device: &DeviceDescriptor,
    user_agent: HeaderValue,
    fingerprint: &str,
) -> HeaderMap {
    let mut headers = BASE_HEADERS.clone();
    headers.insert(USER_AGENT, user_agent);

    let dynamic = [
        ("sec-ch-ua-platform", format!("\"{}\"", device.platform)),
        ("x-fingerprint", fingerprint.to_string()),
        ("x-device-model", device.model.to_string()),
        ("x-platform", device.platform.to_string()),
        ("x-screen-resolution", device.screen_resolution.to_string()),
        ("x-gpu-vendor", device.gpu_vendor.to_string()),
    ];
    for (name, value) in dynamic {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn corpus(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("Mozilla/5.0 (Linux; Android 12; Test {}) Mobile", i))
            .collect()
    }

    #[test]
    fn test_sanitize_user_agent() {
        assert_eq!(
            sanitize_user_agent("  Mozilla/5.0\t(Linux;\u{0007}  Android)\r"),
            "Mozilla/5.0 (Linux; Android)"
        );
    }

    #[test]
    fn test_empty_corpus_is_fatal() {
        assert!(matches!(
            IdentityProvider::new(vec!["   ".to_string(), String::new()]),
            Err(IdentityError::CorpusEmpty { .. })
        ));
    }

    #[test]
    fn test_missing_corpus_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            IdentityProvider::from_file(dir.path().join("missing.txt")),
            Err(IdentityError::CorpusUnreadable { .. })
        ));
    }

    #[test]
    fn test_corpus_file_is_sanitized() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Mozilla/5.0  (Linux; Android 13)\n\n   \n").unwrap();
        let provider = IdentityProvider::from_file(file.path()).unwrap();
        assert_eq!(provider.corpus_size(), 1);
    }

    #[test]
    fn test_no_repeats_until_pool_exhausted() {
        let mut provider = IdentityProvider::new(corpus(50)).unwrap().with_seed(3);

        let mut models = HashSet::new();
        let mut agents = HashSet::new();
        let mut fingerprints = HashSet::new();
        for _ in 0..DEVICE_MODELS.len() {
            let identity = provider.generate();
            assert!(models.insert(identity.device.model));
            assert!(fingerprints.insert(identity.fingerprint.clone()));
            agents.insert(identity.user_agent.clone());
        }
        assert_eq!(provider.used_model_count(), DEVICE_MODELS.len());
        // 21 draws from 50 agents with 10 attempts each; repeats are very unlikely
        assert!(agents.len() >= DEVICE_MODELS.len() - 1);

        // Pool exhausted: the next call resets and still succeeds
        let identity = provider.generate();
        assert!(DEVICE_MODELS.contains(&identity.device.model));
        assert_eq!(provider.used_model_count(), 1);
    }

    #[test]
    fn test_single_agent_corpus_keeps_working() {
        let mut provider = IdentityProvider::new(corpus(1)).unwrap();
        for _ in 0..5 {
            assert_eq!(provider.generate().user_agent, corpus(1)[0]);
        }
    }

    #[test]
    fn test_short_user_agent_falls_back_to_default() {
        let mut provider = IdentityProvider::new(vec!["tiny".to_string()]).unwrap();
        let identity = provider.generate();
        assert_eq!(identity.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(identity.headers[USER_AGENT], DEFAULT_USER_AGENT);
        assert_eq!(identity.headers["x-fingerprint"], identity.fingerprint.as_str());
    }

    #[test]
    fn test_fingerprints_differ_for_same_device() {
        let device = DeviceDescriptor {
            model: "SM-G998B",
            platform: "Android 12",
            screen_resolution: "1080x2400",
            gpu_vendor: "Mali-G78",
        };
        let mut rng = StdRng::seed_from_u64(9);
        let a = fingerprint_for(&device, &mut rng);
        let b = fingerprint_for(&device, &mut rng);
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn test_headers_carry_device_fields() {
        let mut provider = IdentityProvider::new(corpus(3)).unwrap();
        let identity = provider.generate();
        let headers = &identity.headers;
        assert_eq!(headers["x-device-model"], identity.device.model);
        assert_eq!(
            headers["sec-ch-ua-platform"],
            format!("\"{}\"", identity.device.platform).as_str()
        );
        assert_eq!(headers[ACCEPT], "application/json, text/plain, */*");
    }

    #[test]
    fn test_device_descriptors_are_recorded_whole() {
        let mut provider = IdentityProvider::new(corpus(5)).unwrap().with_seed(11);

        let mut keys = HashSet::new();
        for _ in 0..DEVICE_MODELS.len() {
            let device = provider.generate().device;
            assert!(provider.used_devices.contains(&device.key()));
            assert!(keys.insert(device.key()));
        }
        assert_eq!(provider.used_device_count(), DEVICE_MODELS.len());

        // Model pool exhausted: both sets restart from the new draw
        let device = provider.generate().device;
        assert_eq!(provider.used_device_count(), 1);
        assert!(provider.used_devices.contains(&device.key()));
    }

    #[test]
    fn test_dedup_set_clears_at_capacity() {
        let mut set = DedupSet::new(2);
        set.insert("a".to_string());
        set.insert("b".to_string());
        assert_eq!(set.len(), 2);
        set.insert("c".to_string());
        assert_eq!(set.len(), 1);
        assert!(set.contains("c"));
        assert!(!set.contains("a"));
    }
}
