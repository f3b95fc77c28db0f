//! Layout and rendering

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use moviefinder_core::{
    view::{FavoriteRow, ItemView, LinkRow, MovieRow},
    ScrollMetrics, ViewModel,
};

use crate::theme::Theme;

const PLACEHOLDER: &str = "Digite o nome de um filme...";

/// Columns reserved on the right of the dropdown for the favorite marker.
pub const STAR_COLUMNS: u16 = 3;

/// Which widget receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Favorites,
}

/// Message shown in the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

/// Everything a frame draws.
pub struct Screen<'a> {
    pub view: &'a ViewModel,
    pub favorites: &'a [FavoriteRow],
    pub focus: Focus,
    /// Dropdown scroll offset, in lines.
    pub scroll: usize,
    /// Scroll so the selected item is visible.
    pub follow_selection: bool,
    pub status: Option<&'a Status>,
}

/// Calculated areas of the screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Areas {
    pub input: Rect,
    pub hint: Rect,
    pub banner: Rect,
    pub favorites: Rect,
    pub status: Rect,
}

pub struct UiLayout;

impl UiLayout {
    pub fn calculate_areas(area: Rect) -> Areas {
        let vertical = Layout::vertical([
            Constraint::Length(3), // Input
            Constraint::Length(1), // Hint
            Constraint::Length(1), // Error banner
            Constraint::Min(3),    // Favorites
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        Areas {
            input: vertical[0],
            hint: vertical[1],
            banner: vertical[2],
            favorites: vertical[3],
            status: vertical[4],
        }
    }

    /// The dropdown overlays the favorites table, sized to its content.
    pub fn dropdown_area(areas: &Areas, content_lines: usize) -> Rect {
        let wanted = (content_lines as u16).saturating_add(2);
        Rect {
            x: areas.input.x,
            y: areas.favorites.y,
            width: areas.input.width,
            height: wanted.min(areas.favorites.height),
        }
    }
}

/// What a dropdown line belongs to, for hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineTarget {
    pub item: Option<usize>,
    pub sentinel: bool,
}

/// A rendered dropdown line.
pub struct DropdownLine {
    pub target: LineTarget,
    pub line: Line<'static>,
    /// Favorite marker drawn in the right-hand column.
    pub star: Option<bool>,
}

/// Where the dropdown was drawn and what each line holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownGeometry {
    /// Inside the border.
    pub inner: Rect,
    pub targets: Vec<LineTarget>,
    pub scroll: usize,
}

/// A click inside the dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownHit {
    Item(usize),
    Star(usize),
    /// Header, footer or status line
    Other,
}

impl DropdownGeometry {
    pub fn contains(&self, x: u16, y: u16) -> bool {
        // Border included
        let outer = Rect {
            x: self.inner.x.saturating_sub(1),
            y: self.inner.y.saturating_sub(1),
            width: self.inner.width + 2,
            height: self.inner.height + 2,
        };
        contains_point(outer, x, y)
    }

    pub fn hit(&self, x: u16, y: u16) -> Option<DropdownHit> {
        if !self.contains(x, y) {
            return None;
        }
        if !contains_point(self.inner, x, y) {
            return Some(DropdownHit::Other);
        }

        let line = self.scroll + (y - self.inner.y) as usize;
        match self.targets.get(line).and_then(|t| t.item) {
            Some(index) if x >= self.inner.right().saturating_sub(STAR_COLUMNS) => {
                Some(DropdownHit::Star(index))
            }
            Some(index) => Some(DropdownHit::Item(index)),
            None => Some(DropdownHit::Other),
        }
    }

    pub fn max_scroll(&self) -> usize {
        self.targets.len().saturating_sub(self.inner.height as usize)
    }

    pub fn sentinel_visible(&self) -> bool {
        let visible = self.scroll..self.scroll + self.inner.height as usize;
        self.targets
            .iter()
            .enumerate()
            .any(|(line, target)| target.sentinel && visible.contains(&line))
    }

    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: self.scroll as u32,
            scroll_height: self.targets.len() as u32,
            client_height: self.inner.height as u32,
        }
    }
}

/// Result of drawing a frame, kept for mouse handling.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub areas: Areas,
    pub dropdown: Option<DropdownGeometry>,
}

pub fn render(frame: &mut Frame, screen: &Screen, table_state: &mut TableState) -> Rendered {
    let areas = UiLayout::calculate_areas(frame.area());

    render_input(frame, areas.input, screen);
    frame.render_widget(
        Paragraph::new(Span::styled(screen.view.hint, Theme::dim())),
        areas.hint,
    );
    if let Some(error) = &screen.view.error {
        frame.render_widget(
            Paragraph::new(Span::styled(error.clone(), Theme::error())),
            areas.banner,
        );
    }
    render_favorites(frame, areas.favorites, screen, table_state);
    render_status_bar(frame, areas.status, screen.status);

    let dropdown = screen
        .view
        .open
        .then(|| render_dropdown(frame, &areas, screen));

    Rendered { areas, dropdown }
}

fn render_input(frame: &mut Frame, area: Rect, screen: &Screen) {
    let focused = screen.focus == Focus::Search;
    let title = if screen.view.loading {
        " Buscar filme (buscando...) "
    } else {
        " Buscar filme "
    };

    let block = Block::default()
        .title(Span::styled(title, Theme::title()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border(focused));
    let inner = block.inner(area);

    let content = if screen.view.input.is_empty() {
        Span::styled(PLACEHOLDER, Theme::dim())
    } else {
        Span::styled(screen.view.input.clone(), Theme::text())
    };
    frame.render_widget(Paragraph::new(content).block(block), area);

    if focused && inner.width > 0 {
        let offset = (screen.view.input.chars().count() as u16).min(inner.width - 1);
        frame.set_cursor_position((inner.x + offset, inner.y));
    }
}

fn render_dropdown(frame: &mut Frame, areas: &Areas, screen: &Screen) -> DropdownGeometry {
    let width = areas.input.width.saturating_sub(2 + STAR_COLUMNS) as usize;
    let lines = dropdown_lines(screen.view, width);
    let area = UiLayout::dropdown_area(areas, lines.len());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border(true));
    let inner = block.inner(area);

    let targets: Vec<LineTarget> = lines.iter().map(|l| l.target).collect();
    let mut geometry = DropdownGeometry {
        inner,
        targets,
        scroll: 0,
    };
    let mut scroll = screen.scroll.min(geometry.max_scroll());
    if screen.follow_selection {
        if let Some(selected) = lines.iter().position(|l| is_selected(screen.view, l.target)) {
            let last = lines
                .iter()
                .rposition(|l| is_selected(screen.view, l.target))
                .unwrap_or(selected);
            scroll = scroll_to_show(scroll, inner.height as usize, selected, last);
        }
    }
    geometry.scroll = scroll;

    let text_area = Rect {
        width: inner.width.saturating_sub(STAR_COLUMNS),
        ..inner
    };
    let star_area = Rect {
        x: inner.right().saturating_sub(STAR_COLUMNS),
        width: inner.width.min(STAR_COLUMNS),
        ..inner
    };

    let (text, stars): (Vec<Line>, Vec<Line>) = lines
        .into_iter()
        .map(|l| {
            let star = match l.star {
                Some(true) => Line::from(Span::styled(" ★", Theme::favorite(true))),
                Some(false) => Line::from(Span::styled(" ☆", Theme::favorite(false))),
                None => Line::default(),
            };
            let star = if is_selected(screen.view, l.target) {
                star.style(Theme::selected())
            } else {
                star
            };
            (l.line, star)
        })
        .unzip();

    frame.render_widget(Clear, area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(text).scroll((scroll as u16, 0)), text_area);
    frame.render_widget(Paragraph::new(stars).scroll((scroll as u16, 0)), star_area);

    geometry
}

fn is_selected(view: &ViewModel, target: LineTarget) -> bool {
    target
        .item
        .and_then(|i| view.items.get(i))
        .is_some_and(|item| match item {
            ItemView::Movie(row) => row.is_selected,
            ItemView::Link(row) => row.is_selected,
        })
}

/// Lines of the dropdown, top to bottom.
pub fn dropdown_lines(view: &ViewModel, width: usize) -> Vec<DropdownLine> {
    let mut lines = Vec::new();
    let text = |line: Line<'static>| DropdownLine {
        target: LineTarget::default(),
        line,
        star: None,
    };

    if let Some(count) = &view.result_count {
        lines.push(text(Line::from(Span::styled(count.clone(), Theme::dim()))));
    }
    if let Some(message) = &view.no_results {
        lines.push(text(Line::from(Span::styled(message.clone(), Theme::text()))));
    }

    for (index, item) in view.items.iter().enumerate() {
        let target = LineTarget {
            item: Some(index),
            sentinel: false,
        };
        match item {
            ItemView::Movie(row) => {
                lines.push(DropdownLine {
                    target,
                    line: movie_line(row),
                    star: Some(row.is_favorite),
                });
                if let Some(overview) = &row.overview {
                    let mut line = Line::from(Span::styled(
                        format!("  {}", truncate_str(overview, width.saturating_sub(2))),
                        Theme::dim(),
                    ));
                    if row.is_selected {
                        line = line.style(Theme::selected());
                    }
                    lines.push(DropdownLine {
                        target,
                        line,
                        star: None,
                    });
                }
            }
            ItemView::Link(row) => lines.push(DropdownLine {
                target,
                line: link_line(row),
                star: None,
            }),
        }
    }

    if let Some(loading) = view.loading_more {
        lines.push(text(Line::from(Span::styled(loading, Theme::dim()))));
    }
    if view.has_sentinel {
        lines.push(DropdownLine {
            target: LineTarget {
                item: None,
                sentinel: true,
            },
            line: Line::from(Span::styled("…", Theme::dim())),
            star: None,
        });
    }
    if let Some(footer) = &view.footer {
        lines.push(text(Line::from(Span::styled(footer.clone(), Theme::dim()))));
    }

    lines
}

fn movie_line(row: &MovieRow) -> Line<'static> {
    let mut spans: Vec<Span> = row
        .title
        .iter()
        .map(|segment| {
            let style = if segment.highlighted {
                Theme::highlight()
            } else {
                Theme::text()
            };
            Span::styled(segment.text.clone(), style)
        })
        .collect();

    if let Some(year) = row.year {
        spans.push(Span::styled(format!(" ({})", year), Theme::dim()));
    }
    if !row.genres.is_empty() {
        spans.push(Span::styled(format!("  {}", row.genres.join(", ")), Theme::dim()));
    }

    let line = Line::from(spans);
    if row.is_selected {
        line.style(Theme::selected())
    } else {
        line
    }
}

fn link_line(row: &LinkRow) -> Line<'static> {
    let line = Line::from(vec![
        Span::styled("↗ ", Theme::dim()),
        Span::styled(row.label.clone(), Theme::link()),
    ]);
    if row.is_selected {
        line.style(Theme::selected())
    } else {
        line
    }
}

fn render_favorites(frame: &mut Frame, area: Rect, screen: &Screen, state: &mut TableState) {
    let focused = screen.focus == Focus::Favorites;
    let block = Block::default()
        .title(Span::styled(
            format!(" Favoritos ({}) ", screen.favorites.len()),
            Theme::title(),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border(focused));

    if screen.favorites.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height > 0 {
            frame.render_widget(
                Paragraph::new(Span::styled("Nenhum filme favoritado", Theme::dim())),
                Rect { height: 1, ..inner },
            );
        }
        return;
    }

    let header = Row::new(vec!["Título", "Ano", "Gêneros"]).style(Theme::dim());
    let rows: Vec<Row> = screen
        .favorites
        .iter()
        .map(|f| {
            Row::new(vec![
                Cell::from(f.title.clone()),
                Cell::from(f.year.clone()),
                Cell::from(f.genres.clone()),
            ])
            .style(Theme::text())
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(50),
            Constraint::Length(6),
            Constraint::Percentage(50),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(if focused {
        Theme::selected()
    } else {
        Theme::dim()
    });

    frame.render_stateful_widget(table, area, state);
}

/// The favorites row under a click, if any.
pub fn favorites_row_at(area: Rect, state: &TableState, len: usize, x: u16, y: u16) -> Option<usize> {
    // Border and header take the first two lines
    let first_row = area.y + 2;
    if !contains_point(area, x, y) || y < first_row || y >= area.bottom().saturating_sub(1) {
        return None;
    }
    let index = state.offset() + (y - first_row) as usize;
    (index < len).then_some(index)
}

fn render_status_bar(frame: &mut Frame, area: Rect, status: Option<&Status>) {
    if let Some(status) = status {
        let style = if status.is_error {
            Theme::error()
        } else {
            Theme::success()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(status.text.clone(), style)),
            area,
        );
        return;
    }

    let keybinds = [
        ("Tab", "Alternar"),
        ("Enter", "Escolher"),
        ("Ctrl+O", "Detalhes"),
        ("Del", "Remover favorito"),
        ("Ctrl+Q", "Sair"),
    ];

    let mut spans = Vec::new();
    for (i, (key, desc)) in keybinds.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", Theme::dim()));
        }
        spans.push(Span::styled(format!("[{}]", key), Theme::keybind_key()));
        spans.push(Span::styled(format!(" {}", desc), Theme::dim()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Smallest change of `scroll` that shows lines `first..=last`.
pub fn scroll_to_show(scroll: usize, visible: usize, first: usize, last: usize) -> usize {
    if visible == 0 || first < scroll {
        first
    } else if last >= scroll + visible {
        (last + 1 - visible).min(first)
    } else {
        scroll
    }
}

pub fn contains_point(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.right() && y >= area.y && y < area.bottom()
}

/// Truncate to `max_len` characters
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviefinder_core::{
        testing::fixtures, Effect, FavoritesStore, MemoryKeyValueStore, PageResponse,
        SearchController,
    };
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    fn controller_with(text: &str, total: u32, movies: Vec<moviefinder_core::Movie>) -> SearchController {
        let favorites = Arc::new(FavoritesStore::open(Arc::new(MemoryKeyValueStore::new())));
        let mut controller = SearchController::new(favorites, Duration::ZERO);
        controller.apply_genres(Ok(fixtures::genre_catalog()));

        let effects = controller.set_input(text, Instant::now());
        let Some(Effect::FetchPage(request)) = effects.into_iter().next() else {
            panic!("expected a page request");
        };
        let pages = total.div_ceil(20).max(1);
        controller.apply_page(PageResponse {
            request,
            result: Ok(fixtures::page(1, pages, total, movies)),
        });
        controller
    }

    fn geometry(lines: usize, height: u16, scroll: usize) -> DropdownGeometry {
        DropdownGeometry {
            inner: Rect::new(1, 5, 40, height),
            targets: (0..lines)
                .map(|i| LineTarget {
                    item: Some(i),
                    sentinel: false,
                })
                .collect(),
            scroll,
        }
    }

    #[test]
    fn test_scroll_to_show() {
        // Already visible
        assert_eq!(scroll_to_show(0, 5, 2, 2), 0);
        // Above the viewport
        assert_eq!(scroll_to_show(4, 5, 1, 1), 1);
        // Below the viewport
        assert_eq!(scroll_to_show(0, 5, 7, 8), 4);
        // Taller than the viewport keeps the top
        assert_eq!(scroll_to_show(0, 2, 3, 6), 3);
    }

    #[test]
    fn test_hit_testing_accounts_for_scroll_and_star() {
        let g = geometry(10, 4, 3);

        assert_eq!(g.hit(2, 5), Some(DropdownHit::Item(3)));
        assert_eq!(g.hit(2, 8), Some(DropdownHit::Item(6)));
        assert_eq!(g.hit(40, 6), Some(DropdownHit::Star(4)));
        // Border
        assert_eq!(g.hit(0, 5), Some(DropdownHit::Other));
        // Outside
        assert_eq!(g.hit(60, 5), None);
        assert_eq!(g.max_scroll(), 6);
    }

    #[test]
    fn test_sentinel_visibility() {
        let mut g = geometry(10, 4, 0);
        g.targets.push(LineTarget {
            item: None,
            sentinel: true,
        });
        assert!(!g.sentinel_visible());

        g.scroll = g.max_scroll();
        assert!(g.sentinel_visible());
        assert_eq!(
            g.metrics(),
            ScrollMetrics {
                scroll_top: 7,
                scroll_height: 11,
                client_height: 4
            }
        );
    }

    #[test]
    fn test_dropdown_lines_for_results() {
        let controller = controller_with(
            "bat",
            30,
            fixtures::numbered_movies("Batman", 20),
        );
        let view = ViewModel::build(&controller);
        let lines = dropdown_lines(&view, 60);

        // Count header first, sentinel last
        assert_eq!(lines[0].target, LineTarget::default());
        assert_eq!(lines[1].target.item, Some(0));
        assert_eq!(lines[1].star, Some(false));
        assert!(lines.last().is_some_and(|l| l.target.sentinel));
        assert!(view.footer.is_none());
    }

    #[test]
    fn test_dropdown_lines_for_no_results() {
        let controller = controller_with("zzzz", 0, Vec::new());
        let view = ViewModel::build(&controller);
        let lines = dropdown_lines(&view, 60);

        let items: Vec<Option<usize>> = lines.iter().map(|l| l.target.item).collect();
        assert_eq!(items, vec![None, Some(0), Some(1)]);
    }

    #[test]
    fn test_favorites_row_at() {
        let area = Rect::new(0, 10, 50, 8);
        let state = TableState::default();

        assert_eq!(favorites_row_at(area, &state, 3, 5, 12), Some(0));
        assert_eq!(favorites_row_at(area, &state, 3, 5, 14), Some(2));
        // Header
        assert_eq!(favorites_row_at(area, &state, 3, 5, 11), None);
        // Past the last favorite
        assert_eq!(favorites_row_at(area, &state, 3, 5, 15), None);
    }

    #[test]
    fn test_render_draws_dropdown_over_favorites() {
        let controller = controller_with(
            "bat",
            1,
            vec![fixtures::movie(268, "Batman", "1989-06-23")],
        );
        let view = ViewModel::build(&controller);
        let favorites = vec![FavoriteRow {
            id: 1,
            title: "Hidden Under Dropdown".to_string(),
            year: "2000".to_string(),
            genres: String::new(),
            poster_url: None,
        }];
        let screen = Screen {
            view: &view,
            favorites: &favorites,
            focus: Focus::Search,
            scroll: 0,
            follow_selection: false,
            status: None,
        };

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut table_state = TableState::default();
        let mut rendered = Rendered::default();
        terminal
            .draw(|frame| rendered = render(frame, &screen, &mut table_state))
            .unwrap();

        let geometry = rendered.dropdown.expect("dropdown drawn");
        // Header line then the movie row
        assert_eq!(
            geometry.hit(geometry.inner.x, geometry.inner.y + 1),
            Some(DropdownHit::Item(0))
        );

        let buffer = terminal.backend().buffer();
        let screen_text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(screen_text.contains("Batman"));
        assert!(screen_text.contains("1 filme encontrado"));
    }
}
