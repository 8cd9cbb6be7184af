//! Split a small corpus to disk, then build the fine-tune file from it.

use bardeval_corpus::{build_jsonl, write_split, CorpusKind, FineTuneEntry, SplitInput};
use tempfile::tempdir;

const SONNETS: &str = "THE SONNETS\n\n  1\nFrom fairest creatures we desire increase,\nThat thereby beauty's rose might never die,\n\n  2\nWhen forty winters shall besiege thy brow,\nAnd dig deep trenches in thy beauty's field,\n";
const PLAYS: &str = "ACT I\nSCENE I. Elsinore.\nBERNARDO. Who's there?\nFRANCISCO. Nay, answer me.\n";
const VERSE: &str = "Venus and Adonis\n\nEven as the sun with purple-colour'd face\nHad ta'en his last leave of the weeping morn,\n\nRose-cheek'd Adonis hied him to the chase;\nHunting he lov'd, but love he laugh'd to scorn;\n";

#[test]
fn split_then_build_jsonl() {
    let work = tempdir().unwrap();
    let sonnets = work.path().join("sonnets.txt");
    let plays = work.path().join("plays.txt");
    let verse = work.path().join("verse.txt");
    std::fs::write(&sonnets, SONNETS).unwrap();
    std::fs::write(&plays, PLAYS).unwrap();
    std::fs::write(&verse, VERSE).unwrap();

    let out_dir = work.path().join("shakespeare_split");
    let summary = write_split(
        &out_dir,
        &[
            SplitInput::new(CorpusKind::Sonnets, &sonnets),
            SplitInput::new(CorpusKind::Plays, &plays),
            SplitInput::new(CorpusKind::Verse, &verse),
        ],
    )
    .unwrap();

    assert_eq!(
        summary.counts,
        vec![
            (CorpusKind::Sonnets, 2),
            (CorpusKind::Plays, 1),
            (CorpusKind::Verse, 2)
        ]
    );
    assert_eq!(summary.total(), 5);
    for name in ["s0", "s1", "p0", "v0", "v1"] {
        assert!(out_dir.join(name).is_file(), "missing chunk {}", name);
    }

    let jsonl = work.path().join("output.jsonl");
    let file = build_jsonl(&out_dir, &jsonl).unwrap();
    assert_eq!(file.entries, 5);

    let written = std::fs::read_to_string(&jsonl).unwrap();
    let entries: Vec<FineTuneEntry> = written
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(entries.len(), 5);
    assert_eq!(
        entries[0].messages[0].content,
        "SCENE I. Elsinore.\nBERNARDO. Who's there?\nFRANCISCO. Nay, answer me.\n"
    );
    assert!(entries.iter().all(|e| e.messages[0].role == "assistant"));
}

#[test]
fn split_recreates_output_dir() {
    let work = tempdir().unwrap();
    let verse = work.path().join("verse.txt");
    std::fs::write(&verse, "a\nb\n").unwrap();

    let out_dir = work.path().join("out");
    std::fs::create_dir_all(&out_dir).unwrap();
    std::fs::write(out_dir.join("stale"), "old chunk").unwrap();

    write_split(&out_dir, &[SplitInput::new(CorpusKind::Verse, &verse)]).unwrap();

    assert!(!out_dir.join("stale").exists());
    assert_eq!(std::fs::read_to_string(out_dir.join("v0")).unwrap(), "a\nb\n");
}

#[test]
fn missing_input_reports_path() {
    let work = tempdir().unwrap();
    let err = write_split(
        &work.path().join("out"),
        &[SplitInput::new(CorpusKind::Plays, work.path().join("nope.txt"))],
    )
    .unwrap_err();
    assert!(err.to_string().contains("nope.txt"));
}
