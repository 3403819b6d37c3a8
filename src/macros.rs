/// Evaluates an expression and drops its result on purpose.
macro_rules! ignore {
    ($e:expr) => {
        let _ = $e;
    };
}
