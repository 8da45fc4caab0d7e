use std::ops::{Deref, DerefMut};
use std::{io, marker, mem, ptr};

use crate::mdb::error::mdb_result;
use crate::mdb::ffi;
use crate::{PutFlags, ReservedSpace, Result, RoTxn, RwTxn};

/// Selects which native cursor-movement family [`CursorInner::move_on_first`],
/// [`CursorInner::move_on_last`], [`CursorInner::move_on_next`] and
/// [`CursorInner::move_on_prev`] use.
///
/// In a `DUP_SORT` database a single key can be associated with several
/// values. `MoveOperation` picks how a step is interpreted relative to those
/// duplicates:
///
/// - [`Any`](MoveOperation::Any) steps to the next/previous value, whether or
///   not it shares a key with the current entry.
/// - [`NoDup`](MoveOperation::NoDup) skips straight past any remaining
///   duplicates to the next/previous *key*.
/// - [`Dup`](MoveOperation::Dup) stays within the duplicate run of the
///   current key.
///
/// On a database without `DUP_SORT`, all three behave identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOperation {
    /// Move through every value, including duplicates of the same key.
    Any,
    /// Move to the next/previous key, skipping over duplicate values.
    NoDup,
    /// Move through duplicate values of the current key only.
    Dup,
}

/// The raw, codec-agnostic cursor shared by [`RoCursor`] and [`RwCursor`].
///
/// Read-only positioning methods live here so that range and prefix iterators
/// can operate identically whether they were built from a read-only or a
/// read-write transaction.
pub struct CursorInner<'txn> {
    cursor: *mut ffi::MDB_cursor,
    _marker: marker::PhantomData<&'txn ()>,
}

impl<'txn> CursorInner<'txn> {
    fn open(raw_txn: *mut ffi::MDB_txn, dbi: ffi::MDB_dbi) -> Result<CursorInner<'txn>> {
        let mut cursor: *mut ffi::MDB_cursor = ptr::null_mut();
        unsafe { mdb_result(ffi::mdb_cursor_open(raw_txn, dbi, &mut cursor))? }
        Ok(CursorInner { cursor, _marker: marker::PhantomData })
    }

    fn first_op(mo: MoveOperation) -> ffi::MDB_cursor_op {
        match mo {
            MoveOperation::Any | MoveOperation::NoDup => ffi::cursor_op::MDB_FIRST,
            MoveOperation::Dup => ffi::cursor_op::MDB_FIRST_DUP,
        }
    }

    fn last_op(mo: MoveOperation) -> ffi::MDB_cursor_op {
        match mo {
            MoveOperation::Any | MoveOperation::NoDup => ffi::cursor_op::MDB_LAST,
            MoveOperation::Dup => ffi::cursor_op::MDB_LAST_DUP,
        }
    }

    fn next_op(mo: MoveOperation) -> ffi::MDB_cursor_op {
        match mo {
            MoveOperation::Any => ffi::cursor_op::MDB_NEXT,
            MoveOperation::NoDup => ffi::cursor_op::MDB_NEXT_NODUP,
            MoveOperation::Dup => ffi::cursor_op::MDB_NEXT_DUP,
        }
    }

    fn prev_op(mo: MoveOperation) -> ffi::MDB_cursor_op {
        match mo {
            MoveOperation::Any => ffi::cursor_op::MDB_PREV,
            MoveOperation::NoDup => ffi::cursor_op::MDB_PREV_NODUP,
            MoveOperation::Dup => ffi::cursor_op::MDB_PREV_DUP,
        }
    }

    /// Runs a no-key cursor_get operation (FIRST/LAST/NEXT/PREV/GET_CURRENT variants).
    fn get_no_key(&mut self, op: ffi::MDB_cursor_op) -> Result<Option<(&'txn [u8], &'txn [u8])>> {
        let mut key_val = mem::MaybeUninit::uninit();
        let mut data_val = mem::MaybeUninit::uninit();

        let result = unsafe {
            mdb_result(ffi::mdb_cursor_get(
                self.cursor,
                key_val.as_mut_ptr(),
                data_val.as_mut_ptr(),
                op,
            ))
        };

        match result {
            Ok(()) => {
                let key = unsafe { crate::from_val(key_val.assume_init()) };
                let data = unsafe { crate::from_val(data_val.assume_init()) };
                Ok(Some((key, data)))
            }
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Moves the cursor on the first entry of the database.
    pub fn move_on_first(
        &mut self,
        move_operation: MoveOperation,
    ) -> Result<Option<(&'txn [u8], &'txn [u8])>> {
        self.get_no_key(Self::first_op(move_operation))
    }

    /// Moves the cursor on the last entry of the database.
    pub fn move_on_last(
        &mut self,
        move_operation: MoveOperation,
    ) -> Result<Option<(&'txn [u8], &'txn [u8])>> {
        self.get_no_key(Self::last_op(move_operation))
    }

    /// Moves the cursor to the next entry, respecting `move_operation`.
    pub fn move_on_next(
        &mut self,
        move_operation: MoveOperation,
    ) -> Result<Option<(&'txn [u8], &'txn [u8])>> {
        self.get_no_key(Self::next_op(move_operation))
    }

    /// Moves the cursor to the previous entry, respecting `move_operation`.
    pub fn move_on_prev(
        &mut self,
        move_operation: MoveOperation,
    ) -> Result<Option<(&'txn [u8], &'txn [u8])>> {
        self.get_no_key(Self::prev_op(move_operation))
    }

    /// Moves the cursor to the first key greater than or equal to the given one.
    pub fn move_on_key_greater_than_or_equal_to(
        &mut self,
        key: &[u8],
    ) -> Result<Option<(&'txn [u8], &'txn [u8])>> {
        let mut key_val = unsafe { crate::into_val(&key) };
        let mut data_val = mem::MaybeUninit::uninit();

        let result = unsafe {
            mdb_result(ffi::mdb_cursor_get(
                self.cursor,
                &mut key_val,
                data_val.as_mut_ptr(),
                ffi::cursor_op::MDB_SET_RANGE,
            ))
        };

        match result {
            Ok(()) => {
                let key = unsafe { crate::from_val(key_val) };
                let data = unsafe { crate::from_val(data_val.assume_init()) };
                Ok(Some((key, data)))
            }
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the entry the cursor is currently pointing to, without moving it.
    ///
    /// Returns `None` if the cursor has not been positioned yet or the database is empty.
    pub fn current(&mut self) -> Result<Option<(&'txn [u8], &'txn [u8])>> {
        self.get_no_key(ffi::cursor_op::MDB_GET_CURRENT)
    }

    fn del_current(&mut self) -> Result<bool> {
        let result = unsafe { mdb_result(ffi::mdb_cursor_del(self.cursor, 0)) };
        match result {
            Ok(()) => Ok(true),
            Err(e) if e.not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn put_current(&mut self, key: &[u8], data: &[u8]) -> Result<bool> {
        let mut key_val = unsafe { crate::into_val(&key) };
        let mut data_val = unsafe { crate::into_val(&data) };

        let result = unsafe {
            mdb_result(ffi::mdb_cursor_put(
                self.cursor,
                &mut key_val,
                &mut data_val,
                ffi::MDB_CURRENT,
            ))
        };

        match result {
            Ok(()) => Ok(true),
            Err(e) if e.not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn put_current_with_flags(&mut self, flags: PutFlags, key: &[u8], data: &[u8]) -> Result<()> {
        let mut key_val = unsafe { crate::into_val(&key) };
        let mut data_val = unsafe { crate::into_val(&data) };
        let flags = flags.bits() | ffi::MDB_CURRENT;

        unsafe {
            mdb_result(ffi::mdb_cursor_put(self.cursor, &mut key_val, &mut data_val, flags))?
        }

        Ok(())
    }

    fn put_current_reserved_with_flags<F>(
        &mut self,
        flags: PutFlags,
        key: &[u8],
        data_size: usize,
        mut write_func: F,
    ) -> Result<bool>
    where
        F: FnMut(&mut ReservedSpace) -> io::Result<()>,
    {
        let mut key_val = unsafe { crate::into_val(&key) };
        let mut reserved = ffi::reserve_size_val(data_size);
        let flags = flags.bits() | ffi::MDB_CURRENT | ffi::MDB_RESERVE;

        let result =
            unsafe { mdb_result(ffi::mdb_cursor_put(self.cursor, &mut key_val, &mut reserved, flags)) };

        match result {
            Ok(()) => {
                let mut reserved = unsafe { ReservedSpace::from_val(reserved) };
                write_func(&mut reserved)?;
                if reserved.remaining() == 0 {
                    Ok(true)
                } else {
                    Err(io::Error::from(io::ErrorKind::UnexpectedEof).into())
                }
            }
            Err(e) if e.not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn append(&mut self, key: &[u8], data: &[u8]) -> Result<()> {
        let mut key_val = unsafe { crate::into_val(&key) };
        let mut data_val = unsafe { crate::into_val(&data) };

        let result = unsafe {
            mdb_result(ffi::mdb_cursor_put(
                self.cursor,
                &mut key_val,
                &mut data_val,
                ffi::MDB_APPEND,
            ))
        };

        result.map_err(Into::into)
    }
}

impl Drop for CursorInner<'_> {
    fn drop(&mut self) {
        unsafe { ffi::mdb_cursor_close(self.cursor) }
    }
}

/// A read-only cursor over a database's entries.
///
/// All read-only positioning operations live directly on [`CursorInner`];
/// `RoCursor` is that same type under the name used for read-only borrows.
pub type RoCursor<'txn> = CursorInner<'txn>;

impl<'txn> RoCursor<'txn> {
    pub(crate) fn new(txn: &'txn RoTxn, dbi: ffi::MDB_dbi) -> Result<RoCursor<'txn>> {
        CursorInner::open(txn.txn, dbi)
    }
}

/// A read-write cursor, allowing in-place mutation of the entry it is
/// currently pointing to in addition to every [`RoCursor`] operation.
pub struct RwCursor<'txn> {
    cursor: CursorInner<'txn>,
}

impl<'txn> RwCursor<'txn> {
    pub(crate) fn new(txn: &'txn RwTxn, dbi: ffi::MDB_dbi) -> Result<RwCursor<'txn>> {
        Ok(RwCursor { cursor: CursorInner::open(txn.txn.txn, dbi)? })
    }

    /// Deletes the entry the cursor is currently pointing to.
    ///
    /// Returns `true` if an entry was deleted.
    pub fn del_current(&mut self) -> Result<bool> {
        self.cursor.del_current()
    }

    /// Overwrites the value of the entry the cursor is currently pointing to.
    ///
    /// The key must be unchanged; only the value is rewritten.
    pub fn put_current(&mut self, key: &[u8], data: &[u8]) -> Result<bool> {
        self.cursor.put_current(key, data)
    }

    /// Overwrites the value of the current entry, honoring additional put flags.
    pub fn put_current_with_flags(&mut self, flags: PutFlags, key: &[u8], data: &[u8]) -> Result<()> {
        self.cursor.put_current_with_flags(flags, key, data)
    }

    /// Overwrites the value of the current entry using the zero-copy reserved-space path.
    pub fn put_current_reserved_with_flags<F>(
        &mut self,
        flags: PutFlags,
        key: &[u8],
        data_size: usize,
        write_func: F,
    ) -> Result<bool>
    where
        F: FnMut(&mut ReservedSpace) -> io::Result<()>,
    {
        self.cursor.put_current_reserved_with_flags(flags, key, data_size, write_func)
    }

    /// Appends a key-value pair at the end of the database without re-checking sort order.
    ///
    /// The caller must guarantee that `key` sorts after every key already in the database.
    pub fn append(&mut self, key: &[u8], data: &[u8]) -> Result<()> {
        self.cursor.append(key, data)
    }
}

impl<'txn> Deref for RwCursor<'txn> {
    type Target = CursorInner<'txn>;

    fn deref(&self) -> &Self::Target {
        &self.cursor
    }
}

impl DerefMut for RwCursor<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.cursor
    }
}
