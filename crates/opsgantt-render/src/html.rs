//! Standalone HTML board
//!
//! Composes the header, label panel, bar panel and (for boards that have
//! one) the fixed bottom scrollbar into one page. The embedded script keeps
//! the surfaces in step using the same topology as `GanttBoard`: the bar
//! panel drives both axes, the header follows by translation, and a guard
//! flag drops the scroll events caused by our own writes.

use opsgantt_core::{BoardLayout, RenderError, Renderer, VerticalSync};

use crate::{html_escape, HeaderRenderer, LeftPanelRenderer, PanelTheme, RightPanelRenderer};

/// HTML page renderer
#[derive(Clone, Debug)]
pub struct HtmlBoardRenderer {
    pub title: String,
    pub theme: PanelTheme,
    /// Height of the scrollable body in pixels
    pub viewport_height: u32,
    pub header: HeaderRenderer,
    pub left: LeftPanelRenderer,
    pub right: RightPanelRenderer,
}

impl Default for HtmlBoardRenderer {
    fn default() -> Self {
        Self {
            title: "Schedule".into(),
            theme: PanelTheme::default(),
            viewport_height: 640,
            header: HeaderRenderer::new(),
            left: LeftPanelRenderer::new(),
            right: RightPanelRenderer::new(),
        }
    }
}

impl HtmlBoardRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Use the dark theme for the page and every panel
    pub fn dark_theme(mut self) -> Self {
        self.theme = PanelTheme::dark();
        self.header = self.header.theme(PanelTheme::dark());
        self.left = self.left.theme(PanelTheme::dark());
        self.right = self.right.theme(PanelTheme::dark());
        self
    }

    pub fn viewport_height(mut self, height: u32) -> Self {
        self.viewport_height = height;
        self
    }

    fn generate_html(
        &self,
        layout: &BoardLayout<'_>,
        header_svg: &str,
        left_svg: &str,
        right_svg: &str,
    ) -> String {
        let bottom = if layout.bottom_scrollbar {
            format!(
                r#"        <div class="corner"></div>
        <div class="bottom-scrollbar" id="bottom-scrollbar"><div style="width:{}px;height:1px"></div></div>
"#,
                layout.grid_width
            )
        } else {
            String::new()
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <div class="board" data-vertical-sync="{vertical_sync}" data-range-start="{range_start}" data-range-end="{range_end}">
        <div class="corner"></div>
        <div class="header" id="header">
{header_svg}
        </div>
        <div class="left-panel" id="left-panel">
{left_svg}
        </div>
        <div class="right-panel" id="right-panel">
{right_svg}
        </div>
{bottom}    </div>
    <script>
{js}
    </script>
</body>
</html>"#,
            title = html_escape(&self.title),
            css = self.generate_css(layout),
            vertical_sync = match layout.vertical_sync {
                VerticalSync::Follow => "follow",
                VerticalSync::Bidirectional => "bidirectional",
            },
            range_start = layout.range.start.to_rfc3339(),
            range_end = layout.range.end.to_rfc3339(),
            header_svg = header_svg,
            left_svg = left_svg,
            right_svg = right_svg,
            bottom = bottom,
            js = self.generate_js(layout),
        )
    }

    fn generate_css(&self, layout: &BoardLayout<'_>) -> String {
        let left_overflow = match layout.vertical_sync {
            VerticalSync::Follow => "hidden",
            VerticalSync::Bidirectional => "auto",
        };
        format!(
            r#"        body {{
            margin: 16px;
            background: {bg};
            color: {text};
            font-family: {font};
        }}
        h1 {{ font-size: 18px; margin: 0 0 12px 0; }}
        .board {{
            display: grid;
            grid-template-columns: {left_width}px 1fr;
            grid-template-rows: {header_height}px {viewport}px auto;
            border: 1px solid {grid};
        }}
        .corner {{ background: {header_bg}; border-right: 1px solid {grid}; }}
        .header {{ overflow: hidden; background: {header_bg}; }}
        .left-panel {{
            overflow-x: hidden;
            overflow-y: {left_overflow};
            scrollbar-width: none;
            border-right: 1px solid {grid};
        }}
        .right-panel {{ overflow: auto; }}
        .bottom-scrollbar {{ overflow-x: auto; overflow-y: hidden; height: 16px; }}
        .left-panel svg, .right-panel svg, .header svg {{ display: block; }}
        .group-row, .operation-row {{ cursor: pointer; }}"#,
            bg = self.theme.background_color,
            text = self.theme.text_color,
            font = self.theme.font_family,
            left_width = layout.left_width,
            header_height = layout.header_height,
            viewport = self.viewport_height,
            grid = self.theme.grid_color,
            header_bg = self.theme.group_header_bg,
            left_overflow = left_overflow,
        )
    }

    fn generate_js(&self, layout: &BoardLayout<'_>) -> String {
        let bidirectional = layout.vertical_sync == VerticalSync::Bidirectional;
        format!(
            r#"        (function () {{
            const right = document.getElementById('right-panel');
            const left = document.getElementById('left-panel');
            const bottom = document.getElementById('bottom-scrollbar');
            const header = document.querySelector('#header g.header');
            const bidirectional = {bidirectional};
            // element -> offset our last write left it at, until its scroll event comes back
            const pendingLeft = new Map();
            const pendingTop = new Map();

            function write(el, prop, pending, value) {{
                const before = el[prop];
                if (Math.abs(before - value) < 0.5) return;
                el[prop] = value;
                if (Math.abs(el[prop] - before) >= 0.5) pending.set(el, el[prop]);
            }}

            // true when this event is the echo of our own write
            function absorb(el, prop, pending) {{
                if (!pending.has(el)) return false;
                const expected = pending.get(el);
                pending.delete(el);
                return Math.abs(el[prop] - expected) < 0.5;
            }}

            function setX(x, source) {{
                if (header) header.setAttribute('transform', 'translate(' + (-x) + ',0)');
                if (source !== right) write(right, 'scrollLeft', pendingLeft, x);
                if (bottom && source !== bottom) write(bottom, 'scrollLeft', pendingLeft, x);
            }}

            function setY(y, source) {{
                if (source !== right) write(right, 'scrollTop', pendingTop, y);
                if (source !== left) write(left, 'scrollTop', pendingTop, y);
            }}

            right.addEventListener('scroll', function () {{
                if (!absorb(right, 'scrollLeft', pendingLeft)) setX(right.scrollLeft, right);
                if (!absorb(right, 'scrollTop', pendingTop)) setY(right.scrollTop, right);
            }});
            if (bottom) {{
                bottom.addEventListener('scroll', function () {{
                    if (!absorb(bottom, 'scrollLeft', pendingLeft)) setX(bottom.scrollLeft, bottom);
                }});
            }}
            if (bidirectional) {{
                left.addEventListener('scroll', function () {{
                    if (!absorb(left, 'scrollTop', pendingTop)) setY(left.scrollTop, left);
                }});
            }} else {{
                left.addEventListener('wheel', function (e) {{
                    right.scrollTop += e.deltaY;
                    e.preventDefault();
                }}, {{ passive: false }});
            }}

            setX({scroll_x}, null);
            setY({scroll_y}, null);
        }})();"#,
            bidirectional = bidirectional,
            scroll_x = layout.scroll_x,
            scroll_y = layout.scroll_y,
        )
    }
}

impl Renderer for HtmlBoardRenderer {
    type Output = String;

    fn render(&self, layout: &BoardLayout<'_>) -> Result<String, RenderError> {
        let header_svg = self.header.render(layout)?;
        let left_svg = self.left.render(layout)?;
        let right_svg = self.right.render(layout)?;
        Ok(self.generate_html(layout, &header_svg, &left_svg, &right_svg))
    }
}
