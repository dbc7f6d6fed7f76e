//! HTML body of the results email.

use std::fmt::Write;

use crate::notify::StudentResultPayload;

/// Colour of the score figure: green from 80, amber from 60, red below.
pub fn score_color(score: u8) -> &'static str {
    match score {
        80.. => "#16a34a",
        60.. => "#ca8a04",
        _ => "#dc2626",
    }
}

/// Subject of the results email.
pub fn subject_line(result: &StudentResultPayload) -> String {
    format!(
        "Résultats de {} {} - Score: {}%",
        result.first_name(),
        result.last_name(),
        result.score()
    )
}

/// Escapes text for inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const CELL: &str = "padding: 12px; border-bottom: 1px solid #e5e7eb;";
const LABEL: &str = "padding: 8px 0; color: #6b7280;";
const VALUE: &str = "padding: 8px 0; font-weight: 600; color: #1f2937;";
const CARD: &str = "background: white; border-radius: 8px; padding: 20px; margin-bottom: 20px; box-shadow: 0 1px 3px rgba(0,0,0,0.1);";
const HEADING: &str = "margin: 0 0 15px 0; color: #1f2937; font-size: 18px;";

/// Renders the full HTML document sent to the professor.
pub fn render_results_email(result: &StudentResultPayload) -> String {
    let full_name = escape_html(&format!("{} {}", result.first_name(), result.last_name()));
    let mut html = String::new();

    // Writing into a String cannot fail.
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Résultats de simulation d'entretien</title>
</head>
<body style="font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
  <div style="background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); padding: 30px; border-radius: 12px 12px 0 0; text-align: center;">
    <h1 style="color: white; margin: 0; font-size: 24px;">🎯 Résultats de Simulation</h1>
    <p style="color: rgba(255,255,255,0.9); margin: 10px 0 0 0;">Entretien Professionnel</p>
  </div>
  <div style="background: #f8fafc; padding: 30px; border: 1px solid #e5e7eb; border-top: none;">
    <div style="{CARD}">
      <h2 style="{HEADING}">👤 Informations de l'étudiant</h2>
      <table style="width: 100%; border-collapse: collapse;">
"#
    );

    for (label, value) in [
        ("Nom complet:", full_name),
        ("Niveau:", escape_html(result.grade())),
        ("Spécialité:", escape_html(result.specialty())),
        ("Groupe:", escape_html(result.group())),
    ] {
        let _ = write!(
            html,
            r#"        <tr><td style="{LABEL}">{label}</td><td style="{VALUE}">{value}</td></tr>
"#
        );
    }

    let _ = write!(
        html,
        r#"      </table>
    </div>
    <div style="{CARD} text-align: center;">
      <h2 style="{HEADING}">🏆 Score Final</h2>
      <div style="font-size: 48px; font-weight: bold; color: {color};">{score}%</div>
      <p style="color: #6b7280; margin: 10px 0 0 0;">{completed}/5 niveaux complétés • {minutes} min</p>
    </div>
    <div style="{CARD}">
      <h2 style="{HEADING}">📊 Détail par niveau</h2>
      <table style="width: 100%; border-collapse: collapse;">
        <thead>
          <tr style="background: #f3f4f6;">
            <th style="padding: 12px; text-align: left; border-bottom: 2px solid #e5e7eb;">Niveau</th>
            <th style="padding: 12px; text-align: center; border-bottom: 2px solid #e5e7eb;">Statut</th>
          </tr>
        </thead>
        <tbody>
"#,
        color = score_color(*result.score()),
        score = result.score(),
        completed = result.completed_levels().len(),
        minutes = result.time_elapsed(),
    );

    for level in result.level_results() {
        let (badge, status) = if *level.completed() {
            ("background-color: #dcfce7; color: #166534;", "✓ Complété")
        } else {
            ("background-color: #fee2e2; color: #991b1b;", "✗ Non complété")
        };
        let _ = write!(
            html,
            r#"          <tr>
            <td style="{CELL}">Niveau {number}: {title}</td>
            <td style="{CELL} text-align: center;"><span style="padding: 4px 12px; border-radius: 20px; font-size: 12px; font-weight: 600; {badge}">{status}</span></td>
          </tr>
"#,
            number = level.level(),
            title = escape_html(level.title()),
        );
    }

    html.push_str(
        r#"        </tbody>
      </table>
    </div>
  </div>
  <div style="background: #1f2937; padding: 20px; border-radius: 0 0 12px 12px; text-align: center;">
    <p style="color: #9ca3af; margin: 0; font-size: 12px;">Email généré automatiquement par le simulateur d'entretien</p>
  </div>
</body>
</html>
"#,
    );
    html
}
