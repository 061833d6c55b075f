// End-to-end tests for the rendering pipeline
// These tests drive drawing, density upgrades and composition together
// through the public API.

use coupe_display::palette::{OVERLAY_GREY, OVERLAY_WHITE};
use coupe_display::*;

fn pipeline(depth: Depth) -> (EmulatedScreen, Palette, DisplayCompositor, MemorySurface) {
    let screen = EmulatedScreen::new(SCREEN_WIDTH_LO, SCREEN_HEIGHT);
    let palette = Palette::new(depth);
    let compositor = DisplayCompositor::new(
        SCREEN_WIDTH_LO,
        SCREEN_HEIGHT,
        depth,
        ComposeOptions::default(),
    );
    let surface = MemorySurface::new(SCREEN_WIDTH_HI, SCREEN_HEIGHT, depth);
    (screen, palette, compositor, surface)
}

#[test]
fn test_draw_then_compose_clears_minimal_span() {
    let (mut screen, palette, mut compositor, mut surface) = pipeline(Depth::Rgba8888);

    // Settle the initial full redraw
    compositor.compose(&mut screen, &palette, &mut surface);
    assert_eq!(screen.buffer().dirty().span(), None);

    // A few scattered draws
    screen.buffer_mut().fill_rect(10, 30, 50, 4, 42);
    screen.buffer_mut().plot(100, 90, 7);
    screen.buffer_mut().draw_line(0, 120, 200, 0, 9);

    // One pass redraws exactly lines 30..=120 and clears them
    let changed = compositor
        .compose(&mut screen, &palette, &mut surface)
        .expect("dirty lines should produce a transfer");
    assert_eq!(changed.y, 30);
    assert_eq!(changed.h, 91);
    assert_eq!(screen.buffer().dirty().span(), None);
}

#[test]
fn test_composed_pixels_match_palette() {
    let (mut screen, palette, mut compositor, mut surface) = pipeline(Depth::Rgba8888);

    screen.upgrade_line(0);
    screen.line_mut(0)[..SCREEN_WIDTH_HI].fill(OVERLAY_WHITE);
    compositor.compose(&mut screen, &palette, &mut surface);

    let row = &surface.data()[..SCREEN_WIDTH_HI * 4];
    for px in row.chunks_exact(4) {
        assert_eq!(px, &[0xFF, 0xFF, 0xFF, 0xFF]);
    }
}

#[test]
fn test_mixed_density_frame() {
    let (mut screen, palette, mut compositor, mut surface) = pipeline(Depth::Indexed8);

    // Low-density line: stored narrow, output doubled
    screen.line_mut(10)[..SCREEN_WIDTH_LO].fill(3);
    // High-density line: stored wide, output as-is
    screen.upgrade_line(11);
    for (i, v) in screen.line_mut(11)[..SCREEN_WIDTH_HI].iter_mut().enumerate() {
        *v = (i % 7) as u8;
    }

    compositor.compose(&mut screen, &palette, &mut surface);

    let pitch = surface.pitch();
    assert!(surface.data()[10 * pitch..11 * pitch].iter().all(|&v| v == 3));
    for (i, &v) in surface.data()[11 * pitch..12 * pitch].iter().enumerate() {
        assert_eq!(v, (i % 7) as u8);
    }
}

#[test]
fn test_upgrade_preserves_composed_output() {
    // Upgrading a line without drawing must not change what the compositor
    // produces for it
    let (mut screen, palette, mut compositor, mut surface) = pipeline(Depth::Rgb565);

    screen.line_mut(50)[..SCREEN_WIDTH_LO].fill(99);
    compositor.compose(&mut screen, &palette, &mut surface);
    let before = surface.data()[50 * surface.pitch()..51 * surface.pitch()].to_vec();

    screen.upgrade_line(50);
    screen.mark_all_dirty();
    compositor.compose(&mut screen, &palette, &mut surface);
    let after = &surface.data()[50 * surface.pitch()..51 * surface.pitch()];
    assert_eq!(&before[..], after);
}

#[test]
fn test_overlay_text_through_pipeline() {
    let (mut screen, palette, mut compositor, mut surface) = pipeline(Depth::Rgba8888);

    for y in 0..16 {
        screen.upgrade_line(y);
    }
    screen.buffer_mut().frame_rect(0, 0, 120, 16, OVERLAY_GREY, true);
    screen.buffer_mut().draw_string(4, 4, "\x07WSTATUS", OVERLAY_GREY);
    compositor.compose(&mut screen, &palette, &mut surface);

    // Some pixels in the text area decode to the bright overlay white
    let white = [0xFF, 0xFF, 0xFF, 0xFF];
    let found = surface.data()[4 * surface.pitch()..12 * surface.pitch()]
        .chunks_exact(4)
        .any(|px| px == white);
    assert!(found);
}

#[test]
fn test_mode_negotiation_feeds_compositor() {
    // A host that only offers 16-bit surfaces: negotiation lands there and
    // the pipeline runs at that depth
    let requested = VideoMode::new(SCREEN_WIDTH_HI, SCREEN_HEIGHT, Depth::Rgba8888);
    let mode = negotiate(
        &mut |m: &VideoMode| m.depth == Depth::Rgb565,
        requested,
        &[],
    )
    .expect("16-bit fallback should be found");
    assert_eq!(mode.depth, Depth::Rgb565);

    let (mut screen, _, _, _) = pipeline(Depth::Rgba8888);
    let palette = Palette::new(mode.depth);
    let mut compositor = DisplayCompositor::new(
        SCREEN_WIDTH_LO,
        SCREEN_HEIGHT,
        mode.depth,
        ComposeOptions::default(),
    );
    let mut surface = MemorySurface::new(mode.width, mode.height, mode.depth);
    assert!(compositor.compose(&mut screen, &palette, &mut surface).is_some());
}

#[test]
fn test_pointer_round_trip_against_compositor_rects() {
    let (mut screen, palette, mut compositor, mut surface) = pipeline(Depth::Rgba8888);
    compositor.compose(&mut screen, &palette, &mut surface);

    let mapper = CoordinateMapper::new(compositor.source_rect(), compositor.target_rect(), true);
    for d in [-100, -1, 0, 1, 33, 400] {
        let (hx, hy) = mapper.to_host(d, d);
        let (ex, ey) = mapper.to_emulated(hx, hy);
        assert!((ex - d).abs() <= 1);
        assert!((ey - d).abs() <= 1);
    }
}
