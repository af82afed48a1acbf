// Built-in views, registered by name for `trellis run --demo <name>`.

use std::sync::OnceLock;
use std::time::Duration;

use trellis::prelude::*;

/// Bundled with the CLI under `assets/`.
const ARROW_CIRCLE_SVG: &str = "arrow_circle.svg";

static TITLE_OVERRIDE: OnceLock<String> = OnceLock::new();

/// Use `title` for every window a demo opens.
pub fn set_window_title(title: String) {
    let _ = TITLE_OVERRIDE.set(title);
}

fn title(default: &str) -> String {
    TITLE_OVERRIDE.get().cloned().unwrap_or_else(|| default.to_string())
}

// ---------------------------------------------------------------------------
// hello
// ---------------------------------------------------------------------------

fn hello_view() -> Div {
    div()
        .flex()
        .flex_col()
        .size_full()
        .justify_center()
        .items_center()
        .bg(rgb(0x1e1e1e))
        .child(
            div()
                .flex()
                .flex_col()
                .items_center()
                .gap(16.0)
                .child(
                    div()
                        .text_color(Rgb::WHITE)
                        .text_size(32.0)
                        .font_weight(700.0)
                        .child("Hello, World!"),
                )
                .child(
                    div()
                        .text_color(rgb(0xaaaaaa))
                        .text_size(16.0)
                        .child("Built in Rust, drawn natively"),
                ),
        )
}

fn open_hello(app: &App) -> TrellisResult<()> {
    app.open_window(&title("Hello World"), hello_view)?;
    Ok(())
}

trellis::register_view!("hello", "centered greeting on a dark background", open_hello);

// ---------------------------------------------------------------------------
// layout
// ---------------------------------------------------------------------------

fn sidebar_item(label: &str) -> Div {
    div().text_color(rgb(0xdddddd)).child(label)
}

fn layout_view() -> Div {
    div()
        .flex()
        .flex_col()
        .w(800.0)
        .h(600.0)
        .bg(rgb(0xf0f0f0))
        .child(
            div()
                .w(600.0)
                .h(60.0)
                .bg(rgb(0x333333))
                .flex()
                .items_center()
                .justify_center()
                .child(
                    div()
                        .text_color(Rgb::WHITE)
                        .text_size(24.0)
                        .child("Flexbox Layout Demo"),
                ),
        )
        .child(
            div().flex().size_full().gap(20.0).p(20.0).child(
                div()
                    .w(150.0)
                    .h(400.0)
                    .bg(rgb(0x444444))
                    .flex()
                    .flex_col()
                    .items_center()
                    .p(10.0)
                    .gap(10.0)
                    .children((1..=3).map(|i| sidebar_item(&format!("Sidebar Item {i}")))),
            ),
        )
}

fn open_layout(app: &App) -> TrellisResult<()> {
    app.open_window(&title("Layout"), layout_view)?;
    Ok(())
}

trellis::register_view!("layout", "header and sidebar flexbox layout", open_layout);

// ---------------------------------------------------------------------------
// animation
// ---------------------------------------------------------------------------

fn animation_view() -> Div {
    let spinner = svg()
        .size(20.0)
        .path(ARROW_CIRCLE_SVG)
        .text_color(Rgb::BLACK)
        .with_animation(
            "image_circle",
            Animation::new(Duration::from_secs(2)).repeat(),
            |frame, delta| {
                frame.rotate(delta);
            },
        );

    div()
        .flex()
        .flex_col()
        .size_full()
        .bg(Rgb::WHITE)
        .text_color(Rgb::BLACK)
        .justify_between()
        .child(
            div()
                .flex()
                .flex_col()
                .h(150.0)
                .size_full()
                .justify_center()
                .items_center()
                .text_size(24.0)
                .gap(16.0)
                .child("Hello Animation")
                .child(spinner),
        )
}

fn open_animation(app: &App) -> TrellisResult<()> {
    app.open_window(&title("Animation Example"), animation_view)?;
    Ok(())
}

trellis::register_view!("animation", "spinning SVG driven by per-frame ticks", open_animation);

// ---------------------------------------------------------------------------
// svg_icon
// ---------------------------------------------------------------------------

fn svg_icon_view() -> Div {
    div()
        .flex()
        .flex_col()
        .size_full()
        .bg(rgb(0x222222))
        .justify_center()
        .items_center()
        .gap(20.0)
        .child(div().text_color(Rgb::WHITE).text_size(24.0).child("SVG Support"))
        .child(svg().path(ARROW_CIRCLE_SVG).size(48.0).text_color(rgb(0x00ff00)))
        .child(
            div()
                .text_color(rgb(0xaaaaaa))
                .child("A green icon should appear above"),
        )
}

fn open_svg_icon(app: &App) -> TrellisResult<()> {
    app.open_window(&title("SVG Icon"), svg_icon_view)?;
    Ok(())
}

trellis::register_view!("svg_icon", "static SVG loaded from the assets root", open_svg_icon);

// ---------------------------------------------------------------------------
// styled
// ---------------------------------------------------------------------------

fn styled_view() -> Div {
    div()
        .flex()
        .flex_col()
        .size_full()
        .bg(rgb(0x111111))
        .justify_center()
        .items_center()
        .child(
            div()
                .w(400.0)
                .h(300.0)
                .bg(rgb(0x2a2a2a))
                .p(20.0)
                .gap(10.0)
                .flex()
                .flex_col()
                .child(
                    div()
                        .text_color(rgb(0xff0000))
                        .text_size(32.0)
                        .child("Hello Styled Text!"),
                )
                .child(
                    div()
                        .w(100.0)
                        .h(40.0)
                        .bg(rgb(0x4a90e2))
                        .justify_center()
                        .items_center()
                        .flex()
                        .child(div().child("Button?")),
                ),
        )
}

fn open_styled(app: &App) -> TrellisResult<()> {
    app.open_window(&title("Styled"), styled_view)?;
    Ok(())
}

trellis::register_view!("styled", "nested boxes with text styling", open_styled);

#[cfg(test)]
mod tests {
    use super::*;
    use trellis::runtime::testing::{self, MockKind};
    use trellis::runtime::views;

    fn open_and_draw(name: &str) -> testing::MockTree {
        testing::install();
        let entry = views::find(name).expect("demo registered");
        run(move |app| views::open(entry, app).unwrap()).unwrap();
        let index = testing::windows().len() - 1;
        testing::redraw(index).expect("demo produced a tree")
    }

    #[test]
    fn every_demo_is_registered() {
        let names: Vec<_> = views::all().into_iter().map(|e| e.name).collect();
        for demo in ["animation", "hello", "layout", "styled", "svg_icon"] {
            assert!(names.contains(&demo), "{demo} missing from {names:?}");
        }
    }

    #[test]
    fn hello_renders_both_lines() {
        let tree = open_and_draw("hello");
        assert_eq!(tree.text_leaves(), vec!["Hello, World!", "Built in Rust, drawn natively"]);
    }

    #[test]
    fn layout_lists_three_sidebar_items() {
        let tree = open_and_draw("layout");
        let leaves = tree.text_leaves();
        assert_eq!(leaves[0], "Flexbox Layout Demo");
        assert_eq!(&leaves[1..], ["Sidebar Item 1", "Sidebar Item 2", "Sidebar Item 3"]);
    }

    #[test]
    fn animation_registers_a_spinner() {
        let tree = open_and_draw("animation");
        assert!(tree.find(MockKind::Svg).is_some());
        let anims = testing::animations();
        assert_eq!(anims.last().map(|a| a.id.as_str()), Some("image_circle"));
        assert!(anims.last().is_some_and(|a| a.repeat && a.duration_secs == 2.0));
    }
}
