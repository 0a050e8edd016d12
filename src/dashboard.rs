use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate};
use serde::Serialize;

use crate::registry::{google_flores_comet_score, Corpus, ModelName, TrainingRun};
use crate::state::UiState;
use crate::table::{Column, Row, TableView};

const EMPTY_CELL: &str = "–";

/// Name, language, langpair, date, models toggle.
const BASE_COLUMNS: usize = 5;
const MODEL_COLUMNS: usize = ModelName::ALL.len();
const CORPUS_COLUMNS: usize = 6;

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("af", "Afrikaans"),
    ("ar", "Arabic"),
    ("az", "Azerbaijani"),
    ("be", "Belarusian"),
    ("bg", "Bulgarian"),
    ("bn", "Bangla"),
    ("bs", "Bosnian"),
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("cy", "Welsh"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("eu", "Basque"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("ga", "Irish"),
    ("gl", "Galician"),
    ("gu", "Gujarati"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("hy", "Armenian"),
    ("id", "Indonesian"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ka", "Georgian"),
    ("kk", "Kazakh"),
    ("kn", "Kannada"),
    ("ko", "Korean"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("mk", "Macedonian"),
    ("ml", "Malayalam"),
    ("mr", "Marathi"),
    ("ms", "Malay"),
    ("mt", "Maltese"),
    ("nb", "Norwegian Bokmål"),
    ("nl", "Dutch"),
    ("nn", "Norwegian Nynorsk"),
    ("no", "Norwegian"),
    ("pa", "Punjabi"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sq", "Albanian"),
    ("sr", "Serbian"),
    ("sv", "Swedish"),
    ("sw", "Swahili"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("uz", "Uzbek"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese"),
];

/// English display name for a language tag, falling back to the tag.
pub fn language_name(tag: &str) -> &str {
    let primary = tag.split(['-', '_']).next().unwrap_or(tag).to_lowercase();
    LANGUAGE_NAMES
        .iter()
        .find(|(code, _)| *code == primary)
        .map(|(_, name)| *name)
        .unwrap_or(tag)
}

/// `1536` → `1.5 KB`. Base 1024, at most two decimals.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && exponent < UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }

    // Trim trailing zeros the way a number → string conversion would.
    let rounded = format!("{value:.2}");
    let rounded = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{rounded} {}", UNITS[exponent])
}

/// The day part of a timestamp, `–` when unknown.
pub fn format_date(date: Option<&str>) -> String {
    let Some(date) = date else {
        return EMPTY_CELL.to_string();
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return parsed.format("%Y-%m-%d").to_string();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return parsed.format("%Y-%m-%d").to_string();
    }
    date.chars().take("2025-01-01".len()).collect()
}

/// Column key for a model. Filter keys only allow letters and hyphens, so the
/// teachers are spelled out.
pub fn model_column_key(model: ModelName) -> &'static str {
    match model {
        ModelName::Backwards => "backwards",
        ModelName::Teacher1 => "teacher-one",
        ModelName::Teacher2 => "teacher-two",
        ModelName::Student => "student",
        ModelName::StudentFinetuned => "student-finetuned",
        ModelName::StudentQuantized => "student-quantized",
        ModelName::StudentExported => "student-exported",
    }
}

fn corpus_column_key(label: &str) -> String {
    label.to_lowercase().replace(' ', "-")
}

pub fn columns() -> Vec<Column> {
    let mut columns = vec![
        Column::keyed("name", "Name"),
        Column::keyed("language", "Language"),
        Column::keyed("langpair", "Langpair"),
        Column::keyed("date", "Date"),
        Column::unkeyed("Models"),
    ];
    for model in ModelName::ALL {
        columns.push(Column::keyed(model_column_key(model), model.label()));
    }
    columns.push(Column::unkeyed("Corpora"));
    for (label, _) in TrainingRun::default().corpora() {
        columns.push(Column::keyed(&corpus_column_key(label), label));
    }
    columns
}

fn model_cell(run: &TrainingRun, model: ModelName) -> String {
    let Some(model_run) = run.model(model) else {
        return EMPTY_CELL.to_string();
    };
    match google_flores_comet_score(run, Some(model_run)) {
        Some(comparison) if !comparison.meets_release_criteria() => {
            format!("{} !", comparison.difference)
        }
        Some(comparison) => comparison.difference,
        None => "view".to_string(),
    }
}

fn corpus_cell(run: &TrainingRun, corpus: Option<&Corpus>) -> String {
    match corpus {
        Some(corpus) => format!(
            "{} ({}) {} ({})",
            run.source_lang,
            format_bytes(corpus.source_bytes),
            run.target_lang,
            format_bytes(corpus.target_bytes)
        ),
        None => EMPTY_CELL.to_string(),
    }
}

pub fn training_run_row(run: &TrainingRun, state: &UiState) -> Row {
    let models_toggle = if state.show_models { "Hide" } else { "Show" };
    let corpora_toggle = if state.show_corpora { "Hide" } else { "Show" };

    let mut cells = vec![
        run.name.clone(),
        language_name(run.language_tag()).to_string(),
        run.langpair.clone(),
        format_date(run.date_started.as_deref()),
        models_toggle.to_string(),
    ];
    cells.extend(ModelName::ALL.into_iter().map(|model| model_cell(run, model)));
    cells.push(corpora_toggle.to_string());
    cells.extend(run.corpora().into_iter().map(|(_, corpus)| corpus_cell(run, corpus)));

    Row::new(cells)
}

/// Build the training run table with the state's search applied. Columns
/// outside `shown_columns` are marked hidden, so free text only matches what
/// is printed.
pub fn build_table(runs: &[TrainingRun], state: &UiState) -> TableView {
    let shown = shown_columns(state);
    let mut columns = columns();
    for (index, column) in columns.iter_mut().enumerate() {
        column.hidden = !shown.contains(&index);
    }

    let rows = runs.iter().map(|run| training_run_row(run, state)).collect();
    let mut table = TableView::new(columns, rows);
    table.apply_search(&state.search_string);
    table
}

/// Column indices shown for this state. Hidden groups still take part in
/// filtering.
pub fn shown_columns(state: &UiState) -> Vec<usize> {
    let mut shown: Vec<usize> = (0..BASE_COLUMNS).collect();
    let models = BASE_COLUMNS..BASE_COLUMNS + MODEL_COLUMNS;
    if state.show_models {
        shown.extend(models.clone());
    }
    let corpora_toggle = models.end;
    shown.push(corpora_toggle);
    if state.show_corpora {
        shown.extend(corpora_toggle + 1..corpora_toggle + 1 + CORPUS_COLUMNS);
    }
    shown
}

fn pick<'a>(cells: &'a [String], shown: &[usize]) -> Vec<&'a str> {
    shown
        .iter()
        .map(|&i| cells.get(i).map(String::as_str).unwrap_or_default())
        .collect()
}

pub fn write_text(out: &mut impl Write, table: &TableView, shown: &[usize]) -> Result<()> {
    let header: Vec<&str> = shown
        .iter()
        .map(|&i| table.columns.get(i).map(|c| c.label.as_str()).unwrap_or_default())
        .collect();
    let rows: Vec<Vec<&str>> = table.visible_rows().map(|row| pick(&row.cells, shown)).collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let write_line = |out: &mut dyn Write, cells: &[&str]| -> std::io::Result<()> {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        writeln!(out, "{}", line.join("  ").trim_end())
    };

    write_line(&mut *out, &header)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", rule.join("  "))?;
    for row in &rows {
        write_line(&mut *out, row)?;
    }
    Ok(())
}

pub fn write_csv(out: impl Write, table: &TableView, shown: &[usize]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    let header: Vec<&str> = shown
        .iter()
        .map(|&i| {
            table
                .columns
                .get(i)
                .map(|c| c.key.as_deref().unwrap_or(c.label.as_str()))
                .unwrap_or_default()
        })
        .collect();
    writer.write_record(&header)?;
    for row in table.visible_rows() {
        writer.write_record(pick(&row.cells, shown))?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonTable<'a> {
    columns: Vec<&'a Column>,
    rows: Vec<Vec<&'a str>>,
}

pub fn write_json(out: impl Write, table: &TableView, shown: &[usize]) -> Result<()> {
    let json = JsonTable {
        columns: shown.iter().filter_map(|&i| table.columns.get(i)).collect(),
        rows: table.visible_rows().map(|row| pick(&row.cells, shown)).collect(),
    };
    serde_json::to_writer_pretty(out, &json)?;
    Ok(())
}

/// Language pairs, their runs and the task groups behind each run.
pub fn write_tree(out: &mut impl Write, runs: &[TrainingRun], task_group_url: impl Fn(&str) -> String) -> Result<()> {
    let groups = crate::registry::group_by_langpair(runs);
    writeln!(out, "Training Runs")?;

    let last_pair = groups.len().saturating_sub(1);
    for (pair_index, (langpair, runs)) in groups.iter().enumerate() {
        let pair_prefix = if pair_index == last_pair { "└──" } else { "├──" };
        let connector = if pair_index == last_pair { "    " } else { "│   " };
        writeln!(out, "{pair_prefix} {langpair}")?;

        let last_run = runs.len().saturating_sub(1);
        for (run_index, run) in runs.iter().enumerate() {
            let run_prefix = if run_index == last_run { "└──" } else { "├──" };
            let sub_connector = if run_index == last_run { "    " } else { "│   " };
            writeln!(out, "{connector}{run_prefix} {}", run.name)?;

            let last_task = run.task_group_ids.len().saturating_sub(1);
            for (task_index, task_group_id) in run.task_group_ids.iter().enumerate() {
                let task_prefix = if task_index == last_task { "└──" } else { "├──" };
                writeln!(
                    out,
                    "{connector}{sub_connector}{task_prefix} {}",
                    task_group_url(task_group_id)
                )?;
            }
        }
    }
    Ok(())
}
