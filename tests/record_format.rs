use context_bank::types::{read_records, ContextRecord, GroupId, RecordError, RecordShape};

#[test]
fn each_shape_parses_its_own_field_layout() {
    let plain =
        ContextRecord::parse("alma\tegy piros\tvolt a fán\n", RecordShape::Plain, 1).unwrap();
    assert_eq!(plain.word, "alma");
    assert_eq!(plain.left, "egy piros");
    assert_eq!(plain.right, "volt a fán");
    assert_eq!(plain.sentence, None);

    let with_sentence = ContextRecord::parse(
        "alma\tegy\tvolt\tegy alma volt\r\n",
        RecordShape::WithSentence,
        1,
    )
    .unwrap();
    assert_eq!(with_sentence.sentence.as_deref(), Some("egy alma volt"));

    let grouped =
        ContextRecord::parse("alma\tegy\t\tegy alma\t7", RecordShape::Grouped, 1).unwrap();
    assert_eq!(grouped.right, "");
    assert_eq!(grouped.group_id, Some(GroupId(7)));
    assert_eq!(grouped.frequency, None);

    let grouped_freq =
        ContextRecord::parse("alma\tegy\t\tegy alma\t7\t41", RecordShape::Grouped, 1).unwrap();
    assert_eq!(grouped_freq.frequency, Some(41));

    let with_freq =
        ContextRecord::parse("alma\tegy\tvolt\t12", RecordShape::WithFrequency, 1).unwrap();
    assert_eq!(with_freq.frequency, Some(12));
}

#[test]
fn wrong_field_count_is_fatal() {
    let err = ContextRecord::parse("alma\tegy", RecordShape::Plain, 3).unwrap_err();
    assert!(matches!(err, RecordError::FieldCount { line: 3, found: 2, .. }));

    // A fourth field is not silently folded into the right context
    let err = ContextRecord::parse("alma\tegy\tkettő\thárom", RecordShape::Plain, 1).unwrap_err();
    assert!(matches!(err, RecordError::FieldCount { found: 4, .. }));

    let err = ContextRecord::parse("a\tb\tc\td\te\tf\tg", RecordShape::Grouped, 1).unwrap_err();
    assert!(matches!(err, RecordError::FieldCount { found: 7, .. }));
}

#[test]
fn integer_fields_are_parsed_strictly() {
    for bad in ["", "-1", "+3", "12a", "1.5"] {
        let line = format!("alma\tegy\tvolt\t{bad}");
        let err = ContextRecord::parse(&line, RecordShape::WithFrequency, 9).unwrap_err();
        assert!(
            matches!(err, RecordError::InvalidInteger { line: 9, field: "frequency", .. }),
            "{bad:?} was accepted"
        );
    }
}

#[test]
fn empty_word_is_rejected() {
    let err = ContextRecord::parse("\tegy\tvolt", RecordShape::Plain, 2).unwrap_err();
    assert!(matches!(err, RecordError::EmptyWord { line: 2 }));
}

#[test]
fn rendering_requires_the_fields_of_the_shape() {
    let record = ContextRecord::new("alma", "egy piros", "volt");
    assert_eq!(record.to_line(RecordShape::Plain).unwrap(), "alma\tegy piros\tvolt");
    assert!(matches!(
        record.to_line(RecordShape::WithSentence),
        Err(RecordError::MissingField { field: "sentence", .. })
    ));
    assert!(matches!(
        record.to_line(RecordShape::WithFrequency),
        Err(RecordError::MissingField { field: "frequency", .. })
    ));

    let mut grouped = record.with_sentence("egy piros alma volt");
    assert!(matches!(
        grouped.to_line(RecordShape::Grouped),
        Err(RecordError::MissingField { field: "group_id", .. })
    ));
    grouped.group_id = Some(GroupId(2));
    grouped.frequency = Some(5);
    assert_eq!(
        grouped.to_line(RecordShape::Grouped).unwrap(),
        "alma\tegy piros\tvolt\tegy piros alma volt\t2\t5"
    );
}

#[test]
fn reader_reports_the_offending_line_number() {
    let input = "alma\ta\tb\nkörte\tc\nszilva\td\te\n";
    let results: Vec<_> = read_records(input.as_bytes(), RecordShape::Plain).collect();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(RecordError::FieldCount { line: 2, .. })));
    assert!(results[2].is_ok());
}
