// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// Zones (de haut en bas) :
// 1. Header : titre de l'application
// 2. Saisie : ticker + état (Analyze / Loading…)
// 3. Contenu : erreur, chargement, ou dashboard (en-tête + cartes)
// 4. Footer : raccourcis clavier
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Widgets : Block, Paragraph
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::format::ChangeDirection;
use crate::models::CanonicalSnapshot;
use crate::ui::cards::{build_cards, build_header, Card, CardGroup};

/// Largeur minimale pour afficher les cartes en grille
const GRID_MIN_WIDTH: u16 = 100;

/// Largeur de la colonne des libellés dans une carte
const LABEL_WIDTH: usize = 18;

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = main_layout(frame.size());

    render_header(frame, chunks[0]);
    render_input(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

fn main_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Saisie
            Constraint::Min(0),    // Contenu
            Constraint::Length(3), // Footer
        ])
        .split(area)
}

/// Défilement maximal pour un terminal de taille `area`
///
/// Non nul seulement en mode liste, quand le contenu dépasse la zone visible
pub fn max_scroll(app: &App, area: Rect) -> u16 {
    let content = main_layout(area)[2];
    match &app.snapshot {
        Some(snapshot)
            if app.error.is_none() && !app.is_loading_data() && content.width < GRID_MIN_WIDTH =>
        {
            scroll_limit(&scrolling_lines(app, snapshot), content)
        }
        _ => 0,
    }
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Financial Dashboard ")
        .title_alignment(Alignment::Center);

    let text = Line::from(Span::styled(
        "Analyze companies from the financial analysis backend",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ));

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Ligne de saisie
// ============================================================================

/// Dessine la ligne de saisie du ticker
///
/// Pendant un chargement, la saisie est grisée et le curseur disparaît
fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let (border_color, text_style, status) = if app.is_loading_data() {
        (
            Color::DarkGray,
            Style::default().fg(Color::DarkGray),
            Span::styled("  Loading…", Style::default().fg(Color::Yellow)),
        )
    } else {
        (
            Color::Green,
            Style::default().fg(Color::White),
            Span::styled(
                "  [Enter] Analyze",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        )
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Ticker ");

    let mut spans = vec![
        Span::styled(
            "Ticker: ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.input_buffer.as_str(), text_style),
    ];
    if !app.is_loading_data() {
        spans.push(Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    spans.push(status);

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Contenu principal
// ============================================================================

/// Route vers l'erreur, le chargement, le dashboard ou l'écran d'accueil
fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(error) = &app.error {
        render_message(frame, area, error, Color::Red);
    } else if app.is_loading_data() {
        let symbol = app.pending_symbol.as_deref().unwrap_or("");
        let message = format!("Loading {}…", symbol);
        render_message(frame, area, &message, Color::Yellow);
    } else if let Some(snapshot) = &app.snapshot {
        if area.width >= GRID_MIN_WIDTH {
            render_grid(frame, app, snapshot, area);
        } else {
            render_scrolling(frame, app, snapshot, area);
        }
    } else {
        render_message(
            frame,
            area,
            "Enter a stock ticker (e.g., AAPL, MSFT) and press Enter",
            Color::Gray,
        );
    }
}

/// Message centré dans un bloc (erreur, chargement, accueil)
fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// En-tête de l'entreprise : nom, prix, variation, ticker
fn company_lines(app: &App, snapshot: &CanonicalSnapshot) -> Vec<Line<'static>> {
    let header = build_header(snapshot);

    let mut price_line = vec![Span::styled(
        header.price,
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )];
    if let Some(change) = header.change {
        let color = match change.direction {
            ChangeDirection::Positive => Color::Green,
            ChangeDirection::Negative => Color::Red,
        };
        price_line.push(Span::raw("  "));
        price_line.push(Span::styled(
            change.label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    let mut subline = vec![Span::styled(header.subline, Style::default().fg(Color::Gray))];
    if let Some(classification) = header.classification {
        subline.push(Span::styled(
            format!("  {}", classification),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(as_of) = snapshot.as_of {
        subline.push(Span::styled(
            format!("  as of {}", as_of.format("%Y-%m-%d %H:%M")),
            Style::default().fg(Color::DarkGray),
        ));
    } else if let Some(updated) = app.last_updated {
        subline.push(Span::styled(
            format!("  updated {}", updated.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    vec![
        Line::from(Span::styled(
            header.title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(price_line),
        Line::from(subline),
    ]
}

/// Lignes "libellé  valeur" d'une carte
fn card_lines(card: &Card) -> Vec<Line<'static>> {
    card.rows
        .iter()
        .map(|row| {
            Line::from(vec![
                Span::styled(
                    format!("{:<width$}", row.label, width = LABEL_WIDTH),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    row.value.clone(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect()
}

fn card_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", title))
}

// ============================================================================
// Mode grille (terminal large)
// ============================================================================

/// Dessine les cartes en grille : métriques, états financiers, historique
fn render_grid(frame: &mut Frame, app: &App, snapshot: &CanonicalSnapshot, area: Rect) {
    let cards = build_cards(snapshot);

    let metrics: Vec<&Card> = cards.iter().filter(|c| c.group == CardGroup::Metrics).collect();
    let statements: Vec<&Card> = cards
        .iter()
        .filter(|c| c.group == CardGroup::Statements)
        .collect();
    let history: Vec<&Card> = cards.iter().filter(|c| c.group == CardGroup::History).collect();

    let mut constraints = vec![
        Constraint::Length(5), // En-tête entreprise
        Constraint::Length(row_height(&metrics)),
    ];
    if !statements.is_empty() {
        constraints.push(Constraint::Length(row_height(&statements)));
    }
    if !history.is_empty() {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(0)); // Description

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let company = Paragraph::new(company_lines(app, snapshot)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(company, chunks[0]);

    render_card_row(frame, &metrics, chunks[1]);

    let mut next = 2;
    if !statements.is_empty() {
        render_card_row(frame, &statements, chunks[next]);
        next += 1;
    }
    if let Some(card) = history.first() {
        render_history_line(frame, card, chunks[next]);
        next += 1;
    }

    if let Some(description) = &snapshot.analysis.description {
        render_description(frame, description, chunks[next]);
    }
}

/// Hauteur d'une rangée = plus grande carte + 2 lignes de bordure
fn row_height(row: &[&Card]) -> u16 {
    let rows = row.iter().map(|c| c.rows.len()).max().unwrap_or(0);
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(2)
}

/// Dessine une rangée de cartes de largeurs égales
fn render_card_row(frame: &mut Frame, row: &[&Card], area: Rect) {
    let count = u32::try_from(row.len()).unwrap_or(1).max(1);
    let constraints: Vec<Constraint> = row.iter().map(|_| Constraint::Ratio(1, count)).collect();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (card, column) in row.iter().zip(columns.iter()) {
        let paragraph = Paragraph::new(card_lines(card)).block(card_block(card.title));
        frame.render_widget(paragraph, *column);
    }
}

/// Résumé de l'historique sur une seule ligne : "Low: $1.00   High: ..."
fn render_history_line(frame: &mut Frame, card: &Card, area: Rect) {
    let mut spans = Vec::new();
    for row in &card.rows {
        spans.push(Span::styled(
            format!("{}: ", row.label),
            Style::default().fg(Color::Gray),
        ));
        spans.push(Span::styled(
            format!("{}   ", row.value),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(card_block(card.title));
    frame.render_widget(paragraph, area);
}

fn render_description(frame: &mut Frame, description: &str, area: Rect) {
    if area.height < 3 {
        return;
    }

    let paragraph = Paragraph::new(description.to_string())
        .style(Style::default().fg(Color::Gray))
        .block(card_block("About"))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Mode liste défilante (terminal étroit)
// ============================================================================

/// Toutes les cartes les unes sous les autres
fn scrolling_lines(app: &App, snapshot: &CanonicalSnapshot) -> Vec<Line<'static>> {
    let mut lines = company_lines(app, snapshot);

    for card in build_cards(snapshot) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            card.title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        lines.extend(card_lines(&card));
    }

    if let Some(description) = &snapshot.analysis.description {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            description.clone(),
            Style::default().fg(Color::Gray),
        )));
    }

    lines
}

/// Lignes en trop par rapport à la zone intérieure du bloc
///
/// Une ligne plus large que la zone compte pour plusieurs lignes (retour à la ligne)
fn scroll_limit(lines: &[Line], area: Rect) -> u16 {
    let width = usize::from(area.width.saturating_sub(2)).max(1);
    let height = usize::from(area.height.saturating_sub(2));

    let rows: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();

    u16::try_from(rows.saturating_sub(height)).unwrap_or(u16::MAX)
}

/// Dessine toutes les cartes les unes sous les autres, avec défilement ↑↓
fn render_scrolling(frame: &mut Frame, app: &App, snapshot: &CanonicalSnapshot, area: Rect) {
    let lines = scrolling_lines(app, snapshot);
    let scroll = app.scroll.min(scroll_limit(&lines, area));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Press ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[Esc]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " again to quit, any other key to cancel ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        Line::from(vec![
            Span::styled("[Enter]", key_style),
            Span::raw(" Analyze  "),
            Span::styled("[Ctrl+U]", key_style),
            Span::raw(" Clear  "),
            Span::styled("[↑↓]", key_style),
            Span::raw(" Scroll  "),
            Span::styled("[Esc]", key_style),
            Span::raw(" Quit"),
        ])
    };

    let paragraph = Paragraph::new(shortcuts)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================
// CONCEPT RATATUI : TestBackend
// - Terminal en mémoire, permet de vérifier le rendu sans vrai terminal
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{normalize, RawPayload};
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn rendered_text(app: &App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_render_error() {
        let mut app = App::new("NOPE");
        app.submit();
        app.fetch_failed("ticker not found".to_string());

        let text = rendered_text(&app, 120, 30);
        assert!(text.contains("ticker not found"));
    }

    #[test]
    fn test_render_loading() {
        let mut app = App::new("msft");
        app.submit();

        let text = rendered_text(&app, 120, 30);
        assert!(text.contains("Loading MSFT"));
    }

    #[test]
    fn test_render_snapshot_grid() {
        let mut app = App::new("AAPL");
        app.submit();
        app.snapshot_loaded(normalize(&RawPayload::new(json!({
            "ticker": "AAPL",
            "market_data": {
                "current_price": 150.25,
                "change_percent": 0.015,
                "market_cap": 2.5e12
            }
        }))));

        let text = rendered_text(&app, 140, 40);
        assert!(text.contains("$150.25"));
        assert!(text.contains("+1.50%"));
        assert!(text.contains("$2.50T"));
        assert!(text.contains("Market Overview"));
    }

    #[test]
    fn test_render_snapshot_narrow() {
        let mut app = App::new("AAPL");
        app.submit();
        app.snapshot_loaded(normalize(&RawPayload::new(json!({
            "ticker": "AAPL",
            "market_data": { "current_price": 150.25 }
        }))));

        let text = rendered_text(&app, 60, 40);
        assert!(text.contains("$150.25"));
        assert!(text.contains("Market Overview"));
    }

    #[test]
    fn test_scroll_is_bounded_by_content() {
        let mut app = App::new("AAPL");
        app.submit();
        app.snapshot_loaded(normalize(&RawPayload::new(json!({
            "ticker": "AAPL",
            "market_data": { "current_price": 150.25 },
            "key_metrics": { "roe": 0.25 }
        }))));

        // Terminal large : grille, pas de défilement
        assert_eq!(max_scroll(&app, Rect::new(0, 0, 140, 40)), 0);

        // Terminal étroit et court : le contenu dépasse
        let area = Rect::new(0, 0, 60, 20);
        let limit = max_scroll(&app, area);
        assert!(limit > 0);

        // Un défilement excessif s'arrête sur la dernière carte
        app.scroll = u16::MAX;
        let text = rendered_text(&app, 60, 20);
        assert!(text.contains("Recommendation"));

        app.set_scroll_limit(limit);
        assert_eq!(app.scroll, limit);
    }
}
