use anyhow::Result;
use commons_core::aggregate::MemberRegistry;
use commons_core::matrix::VoteMatrix;
use csv::{QuoteStyle, Writer, WriterBuilder};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use tracing::info;

/// Inert lines at the top of the member file, kept for readers of the legacy layout.
pub const PLACEHOLDER_LINES: usize = 19;

pub const MEMBER_HEADER: [&str; 5] = ["mpid", "firstname", "surname", "party", "PublicWhip URL"];

pub struct OutputPaths {
    pub root: PathBuf,
    pub matrix: PathBuf,
    pub members: PathBuf,
}

impl OutputPaths {
    pub fn new(root: impl Into<PathBuf>, matrix_file: &str, members_file: &str) -> Self {
        let root = root.into();
        Self {
            matrix: root.join(matrix_file),
            members: root.join(members_file),
            root,
        }
    }

    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }
}

/// Renders both files, then writes them. Nothing touches the disk if rendering fails.
pub fn write_outputs(
    paths: &OutputPaths,
    matrix: &VoteMatrix,
    members: &MemberRegistry,
    member_url: &str,
) -> Result<()> {
    let matrix_text = render_matrix(matrix)?;
    let members_text = render_members(members, member_url)?;

    paths.ensure()?;
    write_file(&paths.matrix, &matrix_text)?;
    write_file(&paths.members, &members_text)?;
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)?;
    info!(path = %path.display(), bytes = contents.len(), "written");
    Ok(())
}

// Tab-delimited, never quoted. Record lengths vary in the member file.
fn tsv_writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .flexible(true)
        .from_writer(Vec::new())
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// One header row, then one row per division: id, date, id again, title, then vote codes.
pub fn render_matrix(matrix: &VoteMatrix) -> Result<String> {
    let date_format = format_description!("[year]-[month]-[day]");

    let mut writer = tsv_writer();
    writer.write_record(matrix.header())?;

    for row in &matrix.rows {
        let mut fields = vec![
            row.division_id.to_string(),
            row.date.format(date_format)?,
            row.division_id.to_string(),
            clean(&row.title).into_owned(),
        ];
        fields.extend(row.cells.iter().map(|cell| cell.code().to_string()));
        writer.write_record(&fields)?;
    }

    finish(writer)
}

/// Placeholder lines, the member header, then one row per member in id order.
pub fn render_members(members: &MemberRegistry, member_url: &str) -> Result<String> {
    let mut writer = tsv_writer();
    for i in 0..PLACEHOLDER_LINES {
        writer.write_record([format!("ignore {i}")])?;
    }
    writer.write_record(MEMBER_HEADER)?;

    let url = clean(member_url);
    for member in members.values() {
        let member_id = member.member_id.to_string();
        let first_name = clean(&member.first_name);
        let surname = clean(&member.surname);
        let party = clean(&member.party);
        writer.write_record([member_id.as_str(), &*first_name, &*surname, &*party, &*url])?;
    }

    finish(writer)
}

// Unquoted output, so tabs and line breaks inside a field would shift columns or rows.
fn clean(field: &str) -> Cow<'_, str> {
    if field.contains(['\t', '\r', '\n']) {
        Cow::Owned(field.replace(['\t', '\r', '\n'], " "))
    } else {
        Cow::Borrowed(field)
    }
}
