// ─── Orbital Core ───
// Versioned game-asset access plus the project workspace built on top of it.
//
// Architecture:
//   core/
//     error/    — Serializable error taxonomy shared with the frontend
//     loading/  — Tri-state results, equality gate, promise adapter
//     fs/       — Filesystem collaborator (local disk, in-memory for tests)
//     asset/    — Version catalogue + validated path resolver
//     extract/  — Request list + external extractor sidecar
//     project/  — Project model + CRUD manager
//     state/    — Settings, runtime paths, application context

pub mod asset;
pub mod error;
pub mod extract;
pub mod fs;
pub mod loading;
pub mod project;
pub mod state;
