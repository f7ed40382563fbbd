use super::*;

fn header(columns: &[(u64, bool)]) -> StaticSection {
    let mut section = StaticSection::new(Section::Header);
    let columns: Vec<(ColumnId, bool)> = columns.iter().map(|&(id, h)| (ColumnId(id), h)).collect();
    section.sync_columns(&columns);
    section.mark_clean();
    section
}

fn ids(raw: &[u64]) -> Vec<ColumnId> {
    raw.iter().copied().map(ColumnId).collect()
}

#[test]
fn rows_track_the_default_row() {
    let mut section = header(&[(0, false), (1, false)]);
    assert_eq!(section.append_row(), 0);
    assert!(section.is_dirty());
    section.set_default_row(Some(0)).unwrap();

    section.prepend_row();
    assert_eq!(section.default_row(), Some(1));
    section.insert_row(2).unwrap();
    assert_eq!(section.row_count(), 3);
    assert_eq!(section.default_row(), Some(1));

    section.remove_row(0).unwrap();
    assert_eq!(section.default_row(), Some(0));
    section.remove_row(0).unwrap();
    assert_eq!(section.default_row(), None);

    assert_eq!(
        section.insert_row(5),
        Err(GridError::StaticRowOutOfBounds { index: 5, count: 1 })
    );
    assert!(section.remove_row(1).is_err());
    assert!(section.set_default_row(Some(3)).is_err());
}

#[test]
fn cell_content_and_styles() {
    let mut section = header(&[(0, false), (1, false)]);
    section.append_row();
    section.set_text(0, ColumnId(0), "Name").unwrap();
    section.set_html(0, ColumnId(1), "<b>Age</b>").unwrap();
    section.set_cell_style(0, ColumnId(1), Some("numeric".into())).unwrap();
    section.set_row_style(0, Some("caption".into())).unwrap();

    let row = section.row(0).unwrap();
    assert_eq!(row.cell(ColumnId(0)).unwrap().content(), &CellContent::Text("Name".into()));
    assert_eq!(row.cell(ColumnId(1)).unwrap().content(), &CellContent::Html("<b>Age</b>".into()));
    assert_eq!(row.cell(ColumnId(1)).unwrap().style(), Some("numeric"));
    assert_eq!(row.style(), Some("caption"));

    assert_eq!(
        section.set_text(0, ColumnId(9), "x"),
        Err(GridError::UnknownColumn(ColumnId(9)))
    );
    assert!(section.set_text(1, ColumnId(0), "x").is_err());
}

#[test]
fn hiding_the_section_removes_its_rows_from_layout() {
    let mut section = header(&[(0, false)]);
    section.append_row();
    section.mark_clean();
    section.set_visible(false);
    assert!(section.is_dirty());
    assert_eq!(section.row_count(), 1);
    assert_eq!(section.visible_row_count(), 0);
    section.mark_clean();
    section.set_visible(false);
    assert!(!section.is_dirty());
}

#[test]
fn join_rejects_invalid_groups() {
    let mut section = header(&[(0, false), (1, false), (2, false), (3, false)]);
    section.append_row();

    assert_eq!(section.join(0, &ids(&[1])), Err(GridError::JoinTooFewColumns(1)));
    assert_eq!(
        section.join(0, &ids(&[1, 7])),
        Err(GridError::UnknownColumn(ColumnId(7)))
    );
    assert_eq!(
        section.join(0, &ids(&[1, 1])),
        Err(GridError::ColumnAlreadyJoined(ColumnId(1)))
    );
    section.join(0, &ids(&[1, 2])).unwrap();
    assert_eq!(
        section.join(0, &ids(&[2, 3])),
        Err(GridError::ColumnAlreadyJoined(ColumnId(2)))
    );
    assert!(section.join(3, &ids(&[0, 3])).is_err());
    assert_eq!(section.row(0).unwrap().groups().len(), 1);
}

#[test]
fn colspan_counts_visible_members() {
    let mut section = header(&[(0, false), (1, false), (2, false), (3, false)]);
    section.append_row();
    section.join(0, &ids(&[1, 2, 3])).unwrap();

    assert_eq!(section.colspan(0, ColumnId(0)), 1);
    assert_eq!(section.colspan(0, ColumnId(1)), 3);
    assert_eq!(section.colspan(0, ColumnId(2)), 0);
    assert_eq!(section.cell_range(0, 2), Range::with_length(1, 3));
    assert_eq!(section.cell_range(0, 0), Range::with_length(0, 1));

    // Hiding the first member moves the span to the next visible one.
    section.sync_columns(&[
        (ColumnId(0), false),
        (ColumnId(1), true),
        (ColumnId(2), false),
        (ColumnId(3), false),
    ]);
    assert_eq!(section.colspan(0, ColumnId(2)), 2);
    assert_eq!(section.colspan(0, ColumnId(3)), 0);
    assert_eq!(section.cell_range(0, 1), Range::with_length(1, 2));
}

#[test]
fn reordered_groups_split_into_single_cells() {
    let mut section = header(&[(0, false), (1, false), (2, false)]);
    section.append_row();
    section.join(0, &ids(&[0, 1])).unwrap();
    assert_eq!(section.colspan(0, ColumnId(0)), 2);

    section.sync_columns(&[(ColumnId(0), false), (ColumnId(2), false), (ColumnId(1), false)]);
    assert_eq!(section.colspan(0, ColumnId(0)), 1);
    assert_eq!(section.colspan(0, ColumnId(1)), 1);
    assert_eq!(section.cell_range(0, 0), Range::with_length(0, 1));
}

#[test]
fn removed_columns_leave_their_groups() {
    let mut section = header(&[(0, false), (1, false), (2, false)]);
    section.append_row();
    section.join(0, &ids(&[0, 1, 2])).unwrap();

    section.sync_columns(&[(ColumnId(0), false), (ColumnId(2), false)]);
    assert_eq!(section.row(0).unwrap().group_of(ColumnId(0)), Some(&ids(&[0, 2])[..]));
    assert!(section.row(0).unwrap().cell(ColumnId(1)).is_none());

    section.sync_columns(&[(ColumnId(0), false), (ColumnId(3), false)]);
    assert!(section.row(0).unwrap().groups().is_empty());
    assert!(section.row(0).unwrap().cell(ColumnId(3)).is_some());
}

#[test]
fn unjoin_dissolves_the_group() {
    let mut section = header(&[(0, false), (1, false)]);
    section.append_row();
    section.join(0, &ids(&[0, 1])).unwrap();
    section.mark_clean();
    assert_eq!(section.unjoin(0, ColumnId(1)), Ok(true));
    assert!(section.is_dirty());
    assert_eq!(section.colspan(0, ColumnId(0)), 1);
    assert_eq!(section.unjoin(0, ColumnId(1)), Ok(false));
}
