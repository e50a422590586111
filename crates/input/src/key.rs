/// Keys the demo reacts to. Platform key codes are mapped onto this set by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    C,
    P,
    Q,
    E,
    B,
    Space,
    F1,
    F2,
    Escape,
}
