use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs},
    Frame,
};

use crate::core::prefs::Theme;
use crate::core::registry::{Category, GameDescriptor, GameRegistry};
use crate::core::score::ScoreStore;

/// Colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub accent: Color,
    pub muted: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                fg: Color::Black,
                bg: Color::White,
                accent: Color::Blue,
                muted: Color::DarkGray,
            },
            Theme::Dark => Self {
                fg: Color::White,
                bg: Color::Black,
                accent: Color::Cyan,
                muted: Color::Gray,
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogAction {
    None,
    Open(&'static str),
    Quit,
}

/// Category tabs in display order; `None` is "all".
const TABS: [Option<Category>; 4] = [None, Some(Category::Quick), Some(Category::Puzzle), Some(Category::Arcade)];

/// Home screen: category tabs, a search box and the filtered game list.
#[derive(Debug, Default)]
pub struct CatalogView {
    tab: usize,
    search: String,
    selected: usize,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> Option<Category> {
        TABS[self.tab]
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn visible<'a>(&self, registry: &'a GameRegistry) -> Vec<&'a GameDescriptor> {
        registry.filter(self.category(), &self.search)
    }

    pub fn handle_key(&mut self, key: KeyEvent, registry: &GameRegistry) -> CatalogAction {
        match key.code {
            KeyCode::Left => {
                self.tab = (self.tab + TABS.len() - 1) % TABS.len();
                self.selected = 0;
            }
            KeyCode::Right => {
                self.tab = (self.tab + 1) % TABS.len();
                self.selected = 0;
            }
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                let count = self.visible(registry).len();
                self.selected = (self.selected + 1).min(count.saturating_sub(1));
            }
            KeyCode::Enter => {
                if let Some(game) = self.visible(registry).get(self.selected) {
                    return CatalogAction::Open(game.id);
                }
            }
            KeyCode::Esc => {
                if self.search.is_empty() {
                    return CatalogAction::Quit;
                }
                self.search.clear();
                self.selected = 0;
            }
            KeyCode::Backspace => {
                self.search.pop();
                self.selected = 0;
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search.push(c);
                self.selected = 0;
            }
            _ => {}
        }
        CatalogAction::None
    }

    pub fn render(&self, f: &mut Frame, registry: &GameRegistry, scores: &ScoreStore, palette: Palette, status: &str) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        f.render_widget(Block::default().style(palette.base()), f.area());
        f.render_widget(
            Paragraph::new(format!(" MINI GAME HUB   {status}"))
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center)
                .style(palette.base().add_modifier(Modifier::BOLD)),
            chunks[0],
        );

        let titles: Vec<&str> = TABS
            .iter()
            .map(|tab| tab.map_or("all", Category::as_str))
            .collect();
        f.render_widget(
            Tabs::new(titles)
                .select(self.tab)
                .block(Block::default().title(" CATEGORY ").borders(Borders::ALL))
                .style(palette.base())
                .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)),
            chunks[1],
        );

        f.render_widget(
            Paragraph::new(format!(" > {}_", self.search))
                .block(Block::default().title(" SEARCH ").borders(Borders::ALL))
                .style(palette.base()),
            chunks[2],
        );

        let games = self.visible(registry);
        let items: Vec<ListItem> = if games.is_empty() {
            vec![ListItem::new(" No games match").style(Style::default().fg(palette.muted))]
        } else {
            games
                .iter()
                .enumerate()
                .map(|(i, g)| {
                    let style = if i == self.selected {
                        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
                    } else {
                        palette.base()
                    };
                    ListItem::new(format!(
                        " » {:<22} {:<7} Best: {:<6} {}",
                        g.name,
                        g.category.as_str().to_uppercase(),
                        scores.display(g.id),
                        g.description
                    ))
                    .style(style)
                })
                .collect()
        };
        f.render_widget(
            List::new(items)
                .block(Block::default().title(" GAMES ").borders(Borders::ALL))
                .style(palette.base()),
            chunks[3],
        );

        f.render_widget(
            Paragraph::new("[←/→] Category  [type] Search  [↑/↓] Navigate  [Enter] Play  [F2] Sound  [F3] Theme  [Esc] Quit")
                .alignment(Alignment::Center)
                .style(Style::default().fg(palette.muted).bg(palette.bg)),
            chunks[4],
        );
    }
}
