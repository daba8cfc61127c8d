/// One search candidate from the lookup service. Coordinates arrive as
/// decimal strings, ordered best match first.
#[derive(serde::Deserialize)]
pub(super) struct PlaceCandidate {
    pub(super) lat: String,
    pub(super) lon: String,
}
