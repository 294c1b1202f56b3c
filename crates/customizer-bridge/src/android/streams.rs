// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `java.io.InputStream` / `java.io.OutputStream` as `Read` / `Write`.

use std::io;

use jni::objects::{GlobalRef, JValue};

use super::{call_int, call_void, jni_err, with_env};

/// Largest Java byte array allocated per read or write.
const MAX_CHUNK: usize = 64 * 1024;

fn io_err(e: customizer_core::error::CustomizerError) -> io::Error {
    io::Error::other(e.to_string())
}

/// Reads from a Java `InputStream`. Closed on drop.
pub struct JavaInputStream {
    stream: GlobalRef,
}

impl JavaInputStream {
    pub(crate) fn new(stream: GlobalRef) -> Self {
        Self { stream }
    }
}

impl io::Read for JavaInputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let len = buf.len().min(MAX_CHUNK);

        with_env(|env| {
            let array = env
                .new_byte_array(len as i32)
                .map_err(|e| jni_err(env, "new_byte_array", e))?;
            let read = call_int(
                env,
                self.stream.as_obj(),
                "read",
                "([BII)I",
                &[JValue::Object(&array), JValue::Int(0), JValue::Int(len as i32)],
            )?;
            // -1 marks end of stream.
            if read <= 0 {
                return Ok(0);
            }

            let read = read as usize;
            let mut chunk = vec![0i8; read];
            env.get_byte_array_region(&array, 0, &mut chunk)
                .map_err(|e| jni_err(env, "get_byte_array_region", e))?;
            for (dst, src) in buf.iter_mut().zip(chunk) {
                *dst = src as u8;
            }
            Ok(read)
        })
        .map_err(io_err)
    }
}

impl Drop for JavaInputStream {
    fn drop(&mut self) {
        if let Err(e) = with_env(|env| call_void(env, self.stream.as_obj(), "close", "()V", &[])) {
            tracing::warn!(error = %e, "failed to close input stream");
        }
    }
}

/// Writes to a Java `OutputStream`. Flushed and closed on drop.
pub struct JavaOutputStream {
    stream: GlobalRef,
}

impl JavaOutputStream {
    pub(crate) fn new(stream: GlobalRef) -> Self {
        Self { stream }
    }
}

impl io::Write for JavaOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let chunk = &buf[..buf.len().min(MAX_CHUNK)];
        if chunk.is_empty() {
            return Ok(0);
        }

        with_env(|env| {
            let array = env
                .byte_array_from_slice(chunk)
                .map_err(|e| jni_err(env, "byte_array_from_slice", e))?;
            call_void(
                env,
                self.stream.as_obj(),
                "write",
                "([BII)V",
                &[
                    JValue::Object(&array),
                    JValue::Int(0),
                    JValue::Int(chunk.len() as i32),
                ],
            )?;
            Ok(chunk.len())
        })
        .map_err(io_err)
    }

    fn flush(&mut self) -> io::Result<()> {
        with_env(|env| call_void(env, self.stream.as_obj(), "flush", "()V", &[])).map_err(io_err)
    }
}

impl Drop for JavaOutputStream {
    fn drop(&mut self) {
        // `close` flushes.
        if let Err(e) = with_env(|env| call_void(env, self.stream.as_obj(), "close", "()V", &[])) {
            tracing::warn!(error = %e, "failed to close output stream");
        }
    }
}
