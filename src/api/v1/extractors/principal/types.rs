/*
 * Responsibility
 * - route ごとに要求する capability を型で宣言する
 * - 新しい capability が増えたらここにタグと alias を足す
 */
use super::core::{Authorized, Requirement};
use crate::services::auth::Capability;

pub enum ReadTag {}
pub enum WriteTag {}
pub enum AdminTag {}

impl Requirement for ReadTag {
    const CAPABILITY: Capability = Capability::Read;
}

impl Requirement for WriteTag {
    const CAPABILITY: Capability = Capability::Write;
}

impl Requirement for AdminTag {
    const CAPABILITY: Capability = Capability::Admin;
}

pub type RequireRead = Authorized<ReadTag>;
pub type RequireWrite = Authorized<WriteTag>;
pub type RequireAdmin = Authorized<AdminTag>;
