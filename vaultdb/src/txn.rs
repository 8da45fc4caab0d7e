use std::mem;
use std::ops::Deref;
use std::ptr;

use crate::mdb::error::mdb_result;
use crate::mdb::ffi;
use crate::ref_counter::Releaser;
use crate::{Env, Result};

/// A read-only transaction.
pub struct RoTxn<'e> {
    pub(crate) txn: *mut ffi::MDB_txn,
    env: &'e Env,
    // Held for as long as this handle is alive so that `Env::close` can fail
    // fast with `EnvInUse` instead of racing a concurrent close. Dropped
    // automatically alongside the rest of the transaction.
    _releaser: Releaser<'e>,
}

impl<'e> RoTxn<'e> {
    pub(crate) fn new(env: &'e Env) -> Result<RoTxn<'e>> {
        let _releaser = env.acquire_user()?;
        let mut txn: *mut ffi::MDB_txn = ptr::null_mut();

        unsafe {
            mdb_result(ffi::mdb_txn_begin(
                env.env_mut_ptr(),
                ptr::null_mut(),
                ffi::MDB_RDONLY,
                &mut txn,
            ))?
        };

        Ok(RoTxn { txn, env, _releaser })
    }

    pub(crate) fn env_mut_ptr(&self) -> *mut ffi::MDB_env {
        self.env.env_mut_ptr()
    }

    /// Opens a read-only transaction that owns its [`Env`] handle instead of borrowing it.
    ///
    /// The `Env` is leaked onto the heap to manufacture the `'static` lifetime; this is the
    /// price of a transaction that can outlive the scope it was created in, and is only worth
    /// paying for long-lived readers (e.g. ones handed off to another thread or stored in a
    /// `'static` struct).
    pub(crate) fn static_read_txn(env: Env) -> Result<RoTxn<'static>> {
        let env: &'static Env = Box::leak(Box::new(env));
        RoTxn::new(env)
    }

    /// Commits a read-only transaction.
    ///
    /// Read-only transactions don't usually need to be committed, but doing so is required
    /// after opening a named database for the first time in this process so the newly learned
    /// Dbi handle is shared with the global [`Env`], instead of staying local to this
    /// transaction and causing subsequent transactions to see it as not yet opened.
    pub fn commit(mut self) -> Result<()> {
        let result = unsafe { mdb_result(ffi::mdb_txn_commit(self.txn)) };
        self.txn = ptr::null_mut();
        result.map_err(Into::into)
    }

    /// Resets the read transaction, releasing its locktable slot while keeping it alive so it
    /// can be resumed with [`Self::renew`] without paying for a full `mdb_txn_begin` again.
    pub fn reset(self) -> ResetRoTxn<'e> {
        unsafe { ffi::mdb_txn_reset(self.txn) };
        // Move every field out without running `RoTxn`'s `Drop` (which would
        // abort the now-reset transaction and release the ref-counter slot
        // we want to hand off to `ResetRoTxn` instead).
        let this = mem::ManuallyDrop::new(self);
        let txn = this.txn;
        let env = this.env;
        let _releaser = unsafe { ptr::read(&this._releaser) };
        ResetRoTxn { txn, env, _releaser }
    }
}

impl Drop for RoTxn<'_> {
    fn drop(&mut self) {
        if !self.txn.is_null() {
            abort_txn(self.txn);
        }
    }
}

#[cfg(feature = "sync-read-txn")]
unsafe impl Sync for RoTxn<'_> {}

fn abort_txn(txn: *mut ffi::MDB_txn) {
    // Asserts that the transaction hasn't been already committed.
    assert!(!txn.is_null());
    unsafe { ffi::mdb_txn_abort(txn) }
}

/// A read-only transaction that has been [`reset`](RoTxn::reset) and is waiting to be renewed.
///
/// Resetting a transaction instead of dropping it lets a single thread cycle a reader through
/// `reset`/`renew` repeatedly without re-acquiring a locktable slot each time.
pub struct ResetRoTxn<'e> {
    txn: *mut ffi::MDB_txn,
    env: &'e Env,
    _releaser: Releaser<'e>,
}

impl<'e> ResetRoTxn<'e> {
    /// Renews the reset transaction, bringing it back to the state of a freshly opened
    /// [`RoTxn`] positioned on the environment's latest committed snapshot.
    pub fn renew(self) -> Result<RoTxn<'e>> {
        let this = mem::ManuallyDrop::new(self);
        let env = this.env;
        let txn = this.txn;
        let _releaser = unsafe { ptr::read(&this._releaser) };
        unsafe { mdb_result(ffi::mdb_txn_renew(txn))? };
        Ok(RoTxn { txn, env, _releaser })
    }
}

impl Drop for ResetRoTxn<'_> {
    fn drop(&mut self) {
        if !self.txn.is_null() {
            abort_txn(self.txn);
        }
    }
}

/// A read-write transaction.
pub struct RwTxn<'p> {
    pub(crate) txn: RoTxn<'p>,
}

impl<'p> RwTxn<'p> {
    pub(crate) fn new(env: &'p Env) -> Result<RwTxn<'p>> {
        let _releaser = env.acquire_user()?;
        let mut txn: *mut ffi::MDB_txn = ptr::null_mut();
        unsafe { mdb_result(ffi::mdb_txn_begin(env.env_mut_ptr(), ptr::null_mut(), 0, &mut txn))? };
        Ok(RwTxn { txn: RoTxn { txn, env, _releaser } })
    }

    pub(crate) fn nested(env: &'p Env, parent: &'p mut RwTxn) -> Result<RwTxn<'p>> {
        let _releaser = env.acquire_user()?;
        let mut txn: *mut ffi::MDB_txn = ptr::null_mut();
        let parent_ptr: *mut ffi::MDB_txn = parent.txn.txn;
        unsafe { mdb_result(ffi::mdb_txn_begin(env.env_mut_ptr(), parent_ptr, 0, &mut txn))? };
        Ok(RwTxn { txn: RoTxn { txn, env, _releaser } })
    }

    pub(crate) fn env_mut_ptr(&self) -> *mut ffi::MDB_env {
        self.txn.env.env_mut_ptr()
    }

    /// Commits every operation performed with this transaction, making them visible to
    /// subsequent transactions.
    pub fn commit(mut self) -> Result<()> {
        let result = unsafe { mdb_result(ffi::mdb_txn_commit(self.txn.txn)) };
        self.txn.txn = ptr::null_mut();
        result.map_err(Into::into)
    }

    /// Discards every operation performed with this transaction.
    pub fn abort(mut self) {
        abort_txn(self.txn.txn);
        self.txn.txn = ptr::null_mut();
    }
}

impl<'p> Deref for RwTxn<'p> {
    type Target = RoTxn<'p>;

    fn deref(&self) -> &Self::Target {
        &self.txn
    }
}
