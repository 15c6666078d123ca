//! Panel rendering tests driven through a real board

use chrono::{TimeZone, Utc};
use opsgantt_core::{
    Axis, BoardVariant, GanttBoard, GanttConfig, RawInstant, Renderer, Surface, TaskRecord,
};
use opsgantt_render::right::NowMarker;
use opsgantt_render::{
    HeaderRenderer, HtmlBoardRenderer, LeftPanelRenderer, PanelTheme, RightPanelRenderer,
};
use pretty_assertions::assert_eq;

fn records() -> Vec<TaskRecord> {
    vec![
        TaskRecord::new("t1", "op-10", "WO-0001")
            .product("p1", "Bracket")
            .operation_code("CUT")
            .planner("Lee")
            .worker("Kim")
            .window("2026-01-28 09:00:00", "2026-01-28 11:30:00"),
        TaskRecord::new("t2", "op-10", "WO-0002")
            .product("p1", "Bracket")
            .operation_code("CUT")
            .window("2026-01-28 10:00:00", "2026-01-28 12:00:00"),
        // Unparseable start: row kept, bar skipped
        TaskRecord::new("t3", "op-20", "WO-0003")
            .product("p2", "Hinge")
            .operation_code("WELD")
            .machine("M-3")
            .window("not a time", "2026-01-28 12:00:00"),
        TaskRecord::new("t4", "op-20", "WO-0004")
            .product("p2", "Hinge")
            .operation_code("WELD")
            .window(RawInstant::Missing, RawInstant::Missing),
    ]
}

fn board(variant: BoardVariant) -> GanttBoard {
    let mut board = GanttBoard::new(GanttConfig::default(), variant).unwrap();
    // 10:15 KST
    let now = Utc.with_ymd_and_hms(2026, 1, 28, 1, 15, 0).unwrap();
    board.refresh_at(&records(), now);
    board
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn both_panels_draw_the_same_rows() {
    let board = board(BoardVariant::Product);
    let layout = board.layout();

    let left = LeftPanelRenderer::new().render(&layout).unwrap();
    let right = RightPanelRenderer::new().render(&layout).unwrap();

    for class in ["row group-row", "row operation-row", "row task-row"] {
        assert_eq!(count(&left, class), count(&right, class), "{class}");
    }
    // 2 groups, 2 operations, 4 tasks
    assert_eq!(count(&right, "row task-row"), 4);
    for row in &layout.rows {
        let translate = format!("translate(0,{})", row.top);
        assert!(left.contains(&translate));
        assert!(right.contains(&translate));
    }
}

#[test]
fn invalid_tasks_keep_their_row_but_lose_their_bar() {
    let board = board(BoardVariant::Product);
    let right = RightPanelRenderer::new().render(&board.layout()).unwrap();

    assert_eq!(count(&right, "class=\"bar\""), 2);
    assert!(right.contains("data-task=\"t3\""));
    assert!(right.contains("data-task=\"t4\""));
}

#[test]
fn bar_labels_show_code_worker_and_window() {
    let board = board(BoardVariant::Product);
    let right = RightPanelRenderer::new().render(&board.layout()).unwrap();

    assert!(right.contains("data-label=\"WO-0001 Kim 09:00~11:30\""));
    assert!(right.contains("data-label=\"WO-0002 - 10:00~12:00\""));
}

#[test]
fn missing_optional_fields_render_placeholders() {
    let board = board(BoardVariant::Product);
    let left = LeftPanelRenderer::new().render(&board.layout()).unwrap();

    // op-20 has no planner, t2 has no worker, t3 falls back to its machine
    assert!(left.contains("WELD · -"));
    assert!(left.contains("WO-0002 · -"));
    assert!(left.contains("WO-0003 · M-3"));
}

#[test]
fn bars_use_group_colors() {
    let board = board(BoardVariant::Product);
    let layout = board.layout();
    let right = RightPanelRenderer::new().render(&layout).unwrap();
    assert!(right.contains(&format!("fill=\"{}\"", layout.color_for(0))));
}

#[test]
fn collapsed_group_is_hidden_in_both_panels() {
    let mut board = board(BoardVariant::Product);
    board.toggle_group("p1");
    let layout = board.layout();

    let left = LeftPanelRenderer::new().render(&layout).unwrap();
    let right = RightPanelRenderer::new().render(&layout).unwrap();

    assert!(left.contains("▶ Bracket"));
    assert!(left.contains("▼ Hinge"));
    assert!(!left.contains("WO-0001"));
    assert_eq!(count(&right, "row task-row"), 2);
    assert_eq!(count(&right, "class=\"bar\""), 0);
}

#[test]
fn header_has_one_column_per_tick() {
    let board = board(BoardVariant::Product);
    let layout = board.layout();
    let header = HeaderRenderer::new().render(&layout).unwrap();

    // 09:00..12:00 KST hourly
    assert_eq!(layout.range.ticks.len(), 4);
    assert!(header.contains("01/28 09:00"));
    assert!(header.contains("10:00"));
    assert!(header.contains("12:00"));
    assert!(!header.contains("13:00"));
}

#[test]
fn header_follows_horizontal_scroll() {
    let mut board = board(BoardVariant::Product);
    board.set_viewport(200.0, 100.0);
    board.scroll(Axis::X, Surface::RightPanel, 150.0);
    let header = HeaderRenderer::new().render(&board.layout()).unwrap();
    assert!(header.contains("translate(-150,0)"));
}

#[test]
fn now_marker_inside_range() {
    let board = board(BoardVariant::Product);
    let layout = board.layout();

    let with = RightPanelRenderer::new().render(&layout).unwrap();
    assert!(with.contains("now-line"));
    assert!(with.contains("10:15"));

    let without = RightPanelRenderer::new()
        .with_now_marker(NowMarker::disabled())
        .render(&layout)
        .unwrap();
    assert!(!without.contains("now-line"));
}

#[test]
fn tiny_font_sizes_render() {
    let board = board(BoardVariant::Product);
    let layout = board.layout();
    let theme = PanelTheme {
        font_size: 1,
        ..PanelTheme::light()
    };

    let left = LeftPanelRenderer {
        theme: theme.clone(),
        ..LeftPanelRenderer::new()
    };
    let right = RightPanelRenderer {
        theme,
        ..RightPanelRenderer::new()
    };
    assert!(left.render(&layout).unwrap().contains("font-size=\"0\""));
    assert!(right.render(&layout).unwrap().contains("font-size=\"0\""));
}

#[test]
fn html_board_product_variant() {
    let board = board(BoardVariant::Product);
    let html = HtmlBoardRenderer::new()
        .title("Line <3>")
        .render(&board.layout())
        .unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Line &lt;3&gt;"));
    assert!(html.contains("id=\"header\""));
    assert!(html.contains("id=\"left-panel\""));
    assert!(html.contains("id=\"right-panel\""));
    assert!(!html.contains("id=\"bottom-scrollbar\""));
    assert!(html.contains("data-vertical-sync=\"follow\""));
    assert!(html.contains("const bidirectional = false;"));
}

#[test]
fn html_board_machine_variant() {
    let board = board(BoardVariant::Machine);
    let html = HtmlBoardRenderer::new()
        .dark_theme()
        .render(&board.layout())
        .unwrap();

    assert!(html.contains("id=\"bottom-scrollbar\""));
    assert!(html.contains("data-vertical-sync=\"bidirectional\""));
    assert!(html.contains("overflow-y: auto"));
    assert!(html.contains("const bidirectional = true;"));
    // tasks without a machine land in the unassigned group
    assert!(html.contains("Unassigned"));
    assert!(html.contains("M-3"));
}

#[test]
fn page_script_absorbs_its_own_scroll_echoes() {
    let board = board(BoardVariant::Machine);
    let html = HtmlBoardRenderer::new().render(&board.layout()).unwrap();

    // each mirrored surface drops only the echo matching its pending write
    assert!(html.contains("function absorb(el, prop, pending)"));
    assert!(html.contains("if (!absorb(right, 'scrollLeft', pendingLeft)) setX(right.scrollLeft, right);"));
    assert!(html.contains("if (!absorb(bottom, 'scrollLeft', pendingLeft)) setX(bottom.scrollLeft, bottom);"));
    assert!(html.contains("if (!absorb(left, 'scrollTop', pendingTop)) setY(left.scrollTop, left);"));
    // no time-based guard that a late echo could slip past
    assert!(!html.contains("requestAnimationFrame"));
}
