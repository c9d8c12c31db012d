use ev_test_example::{demo_dir, demo_names, testcase_path};
use ev_tool::assert_case;

#[test]
fn every_demo_matches_its_testcase() {
    let names = demo_names();
    assert!(!names.is_empty(), "expected demo projects");

    for name in names {
        let case_path = testcase_path(&name);
        if !case_path.exists() {
            continue;
        }
        if let Err(error) = assert_case(&demo_dir(&name), &case_path) {
            panic!("demo {} failed: {}", name, error);
        }
    }
}
