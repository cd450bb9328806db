use clipfetch_engine::safe_file_name;
use pretty_assertions::assert_eq;

#[test]
fn keeps_ordinary_names() {
    assert_eq!(safe_file_name("My Clip [720p].mp4"), "My Clip [720p].mp4");
    assert_eq!(safe_file_name("track – live.mp3"), "track – live.mp3");
}

#[test]
fn strips_path_components_and_forbidden_chars() {
    assert_eq!(safe_file_name("../../etc/passwd"), "etc_passwd");
    assert_eq!(safe_file_name("a\\b:c*d?.webm"), "a_b_c_d_.webm");
    assert_eq!(safe_file_name("tab\there.mp4"), "tab_here.mp4");
}

#[test]
fn empty_or_dot_names_fall_back() {
    assert_eq!(safe_file_name(""), "download");
    assert_eq!(safe_file_name(".."), "download");
    assert_eq!(safe_file_name("///"), "download");
}

#[test]
fn reserved_device_names_are_altered() {
    assert_eq!(safe_file_name("CON.mp4"), "CON_.mp4");
    assert_eq!(safe_file_name("nul"), "nul_");
    assert_eq!(safe_file_name("console.mp4"), "console.mp4");
}

#[test]
fn long_names_are_truncated() {
    let long = format!("{}.mp4", "x".repeat(300));
    assert_eq!(safe_file_name(&long).chars().count(), 120);
}
