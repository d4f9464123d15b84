pub fn test_id_val() -> i64 {
  use std::sync::atomic::{AtomicI64, Ordering};
  static COUNT: AtomicI64 = AtomicI64::new(0);

  // test ids sit far above anything a chat platform hands out
  (i32::MAX as i64) << 16 | COUNT.fetch_add(1, Ordering::SeqCst)
}

#[macro_export]
macro_rules! test_id {
  ($id_type:ident) => {
    $id_type::new(chatflow_test_util::test_id_val())
  }
}
