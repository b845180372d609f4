use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=data/surahs.tsv");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("surahs.rs");
    let mut f = fs::File::create(&dest_path).unwrap();

    let source = Path::new("data").join("surahs.tsv");
    let content = fs::read_to_string(&source).unwrap();

    writeln!(f, "pub static SURAHS: &[Surah] = &[").unwrap();

    let mut expected_id = 1u16;
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim_end();
        // Header and blank lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() != 6 {
            panic!("surahs.tsv:{}: expected 6 columns, got {}", line_no + 1, cols.len());
        }

        let id: u16 = cols[0].parse().unwrap();
        // The table must stay dense and ordered so lookups can index by id - 1.
        assert_eq!(id, expected_id, "surahs.tsv:{}: ids must be sequential", line_no + 1);
        expected_id += 1;

        let revelation = match cols[4] {
            "makkah" => "Revelation::Makkah",
            "madinah" => "Revelation::Madinah",
            other => panic!("surahs.tsv:{}: unknown revelation place {other:?}", line_no + 1),
        };
        let verse_count: u16 = cols[5].parse().unwrap();

        writeln!(
            f,
            "    Surah {{ id: {}, name: {:?}, arabic_name: {:?}, meaning: {:?}, revelation: {}, verse_count: {} }},",
            id, cols[1], cols[2], cols[3], revelation, verse_count
        )
        .unwrap();
    }

    assert_eq!(expected_id, 115, "surahs.tsv must list all 114 surahs");
    writeln!(f, "];").unwrap();
}
