use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use voxshift::{
    EngineConfig, Gender, PresetTable, SessionController, StreamDriver,
};

struct CountingAllocator;

static TRACK_ALLOCATIONS: AtomicBool = AtomicBool::new(false);
static ALLOC_CALLS: AtomicUsize = AtomicUsize::new(0);
static ALLOC_BYTES: AtomicUsize = AtomicUsize::new(0);
static REALLOC_CALLS: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL_ALLOCATOR: CountingAllocator = CountingAllocator;

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if TRACK_ALLOCATIONS.load(Ordering::Relaxed) {
            ALLOC_CALLS.fetch_add(1, Ordering::Relaxed);
            ALLOC_BYTES.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if TRACK_ALLOCATIONS.load(Ordering::Relaxed) {
            ALLOC_CALLS.fetch_add(1, Ordering::Relaxed);
            ALLOC_BYTES.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let out = unsafe { System.realloc(ptr, layout, new_size) };
        if TRACK_ALLOCATIONS.load(Ordering::Relaxed) {
            REALLOC_CALLS.fetch_add(1, Ordering::Relaxed);
        }
        out
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }
}

fn begin_alloc_tracking() {
    ALLOC_CALLS.store(0, Ordering::Relaxed);
    ALLOC_BYTES.store(0, Ordering::Relaxed);
    REALLOC_CALLS.store(0, Ordering::Relaxed);
    TRACK_ALLOCATIONS.store(true, Ordering::SeqCst);
}

fn end_alloc_tracking() -> (usize, usize, usize) {
    TRACK_ALLOCATIONS.store(false, Ordering::SeqCst);
    (
        ALLOC_CALLS.load(Ordering::Relaxed),
        REALLOC_CALLS.load(Ordering::Relaxed),
        ALLOC_BYTES.load(Ordering::Relaxed),
    )
}

struct StereoStream;

impl StreamDriver for StereoStream {
    fn is_open(&self) -> bool {
        true
    }
    fn sample_rate(&self) -> u32 {
        48_000
    }
    fn channels(&self) -> u16 {
        2
    }
}

fn test_chunk_stereo(frames: usize, offset: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(frames * 2);
    for n in offset..offset + frames {
        let t = n as f32 / 48_000.0;
        out.push(0.4 * (2.0 * std::f32::consts::PI * 180.0 * t).sin());
        out.push(0.4 * (2.0 * std::f32::consts::PI * 310.0 * t).sin());
    }
    out
}

// Single test in this binary so no other thread allocates while tracking.
#[test]
fn process_steady_state_does_not_allocate() {
    const CHUNK_FRAMES: usize = 256;
    const WARMUP_CHUNKS: usize = 64;
    const MEASURED_CHUNKS: usize = 200;

    let config = EngineConfig::default().with_channels(2);
    let (mut controller, mut engine) =
        SessionController::new(config, PresetTable::default()).unwrap();
    controller.attach_stream(Box::new(StereoStream)).unwrap();
    controller.select_gender(Gender::Female);
    controller.select_preset(4).unwrap();
    controller.start().unwrap();

    let chunks: Vec<Vec<f32>> = (0..WARMUP_CHUNKS + MEASURED_CHUNKS)
        .map(|i| test_chunk_stereo(CHUNK_FRAMES, i * CHUNK_FRAMES))
        .collect();
    let mut output = vec![0.0f32; CHUNK_FRAMES * 2];

    for chunk in &chunks[..WARMUP_CHUNKS] {
        engine.process(chunk, &mut output);
    }

    begin_alloc_tracking();
    for chunk in &chunks[WARMUP_CHUNKS..] {
        engine.process(chunk, &mut output);
    }
    let (alloc_calls, realloc_calls, alloc_bytes) = end_alloc_tracking();

    assert_eq!(
        (alloc_calls, realloc_calls),
        (0, 0),
        "process allocated {} times ({} bytes), reallocated {} times",
        alloc_calls,
        alloc_bytes,
        realloc_calls
    );
    assert!(output.iter().any(|&s| s.abs() > 0.01));
}
